//! In-memory collaborators backed by JSON site fixtures
//!
//! Used by the `issue_report` binary, the integration tests and the bench.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::repositories::{
    AssetUrlResolver, AutomationTrigger, Capabilities, CapabilityResolver, PageSource, ProductSource,
    SignalCollector, SiteDirectory, SiteRecord,
};
use crate::domain::snapshot::{PageRecord, ProductRecord, SignalSet};

/// Everything known about one site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteFixture {
    pub site_id: String,
    pub domain: String,
    /// Actor id → capabilities; listed actors are members
    pub members: HashMap<String, Capabilities>,
    pub pages: Vec<PageRecord>,
    pub products: Vec<ProductRecord>,
    pub signals: SignalSet,
    /// Page/collection asset id → canonical URL
    pub asset_urls: HashMap<String, String>,
    /// Simulate a failing catalog/crawl backend
    pub unavailable: bool,
}

impl SiteFixture {
    pub fn new(site_id: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            domain: domain.into(),
            ..Self::default()
        }
    }

    pub fn with_member(mut self, actor_id: impl Into<String>, capabilities: Capabilities) -> Self {
        self.members.insert(actor_id.into(), capabilities);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureFile {
    Many(Vec<SiteFixture>),
    One(Box<SiteFixture>),
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    sites: HashMap<String, SiteFixture>,
}

impl InMemoryStore {
    pub fn new(fixtures: impl IntoIterator<Item = SiteFixture>) -> Self {
        Self {
            sites: fixtures.into_iter().map(|f| (f.site_id.clone(), f)).collect(),
        }
    }

    /// Parse a single fixture object or an array of fixtures
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: FixtureFile = serde_json::from_str(json).context("Invalid site fixture JSON")?;
        Ok(match parsed {
            FixtureFile::Many(fixtures) => Self::new(fixtures),
            FixtureFile::One(fixture) => Self::new([*fixture]),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn site_ids(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    fn site(&self, site_id: &str) -> Result<&SiteFixture> {
        self.sites
            .get(site_id)
            .ok_or_else(|| anyhow!("No fixture for site {}", site_id))
    }

    fn readable(&self, site_id: &str) -> Result<&SiteFixture> {
        let site = self.site(site_id)?;
        if site.unavailable {
            return Err(anyhow!("Backend unavailable for site {}", site_id));
        }
        Ok(site)
    }
}

#[async_trait]
impl SiteDirectory for InMemoryStore {
    async fn find_site(&self, site_id: &str) -> Result<Option<SiteRecord>> {
        Ok(self.sites.get(site_id).map(|s| SiteRecord {
            id: s.site_id.clone(),
            domain: s.domain.clone(),
        }))
    }

    async fn is_member(&self, site_id: &str, actor_id: &str) -> Result<bool> {
        Ok(self
            .sites
            .get(site_id)
            .is_some_and(|s| s.members.contains_key(actor_id)))
    }
}

#[async_trait]
impl PageSource for InMemoryStore {
    async fn list_pages(&self, site_id: &str) -> Result<Vec<PageRecord>> {
        Ok(self.readable(site_id)?.pages.clone())
    }
}

#[async_trait]
impl ProductSource for InMemoryStore {
    async fn list_products(&self, site_id: &str) -> Result<Vec<ProductRecord>> {
        Ok(self.readable(site_id)?.products.clone())
    }
}

#[async_trait]
impl SignalCollector for InMemoryStore {
    async fn collect_signals(&self, site_id: &str) -> Result<SignalSet> {
        Ok(self.readable(site_id)?.signals.clone())
    }
}

#[async_trait]
impl CapabilityResolver for InMemoryStore {
    async fn resolve_capabilities(&self, site_id: &str, actor_id: &str) -> Result<Capabilities> {
        Ok(self
            .site(site_id)?
            .members
            .get(actor_id)
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AssetUrlResolver for InMemoryStore {
    async fn resolve_asset_url(&self, site_id: &str, asset_id: &str) -> Result<Option<String>> {
        Ok(self.site(site_id)?.asset_urls.get(asset_id).cloned())
    }
}

/// Automation sink that only logs and remembers what it was asked to do
#[derive(Debug, Default)]
pub struct LoggingAutomationTrigger {
    triggered: Mutex<Vec<(String, String)>>,
}

impl LoggingAutomationTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(product_id, reason)` pairs in call order
    pub fn triggered(&self) -> Vec<(String, String)> {
        self.triggered.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AutomationTrigger for LoggingAutomationTrigger {
    async fn trigger(&self, product_id: &str, actor_id: &str, reason: &str) -> Result<()> {
        info!(product_id = %product_id, actor_id = %actor_id, reason = %reason, "🤖 Automation triggered");
        self.triggered
            .lock()
            .map_err(|_| anyhow!("Trigger log poisoned"))?
            .push((product_id.to_string(), reason.to_string()));
        Ok(())
    }
}
