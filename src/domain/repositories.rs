//! Collaborator interfaces consumed by the issue engine
//!
//! Crawling, catalog sync, role resolution and automation live outside this
//! crate. The engine only reads through these traits.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::snapshot::{PageRecord, ProductRecord, SignalSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    pub id: String,
    pub domain: String,
}

/// What the caller may do with fix flows on a site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_generate_drafts: bool,
    pub can_request_approval: bool,
    pub can_apply: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            can_generate_drafts: true,
            can_request_approval: true,
            can_apply: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.can_generate_drafts || self.can_request_approval || self.can_apply
    }
}

#[async_trait]
pub trait SiteDirectory: Send + Sync {
    async fn find_site(&self, site_id: &str) -> Result<Option<SiteRecord>>;
    async fn is_member(&self, site_id: &str, actor_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn list_pages(&self, site_id: &str) -> Result<Vec<PageRecord>>;
}

#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn list_products(&self, site_id: &str) -> Result<Vec<ProductRecord>>;
}

#[async_trait]
pub trait SignalCollector: Send + Sync {
    async fn collect_signals(&self, site_id: &str) -> Result<SignalSet>;
}

#[async_trait]
pub trait CapabilityResolver: Send + Sync {
    async fn resolve_capabilities(&self, site_id: &str, actor_id: &str) -> Result<Capabilities>;
}

/// Resolves a page/collection asset id to its canonical URL within a site
#[async_trait]
pub trait AssetUrlResolver: Send + Sync {
    async fn resolve_asset_url(&self, site_id: &str, asset_id: &str) -> Result<Option<String>>;
}

/// Downstream automation entry point. Callers never depend on the outcome.
#[async_trait]
pub trait AutomationTrigger: Send + Sync {
    async fn trigger(&self, product_id: &str, actor_id: &str, reason: &str) -> Result<()>;
}
