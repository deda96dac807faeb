//! Issue engine use cases
//!
//! One computation per request: authorize, read the snapshot concurrently,
//! run the detectors, decorate once, then hand the decorated set to
//! whichever view was requested.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::automation::{automation_candidates, AutomationDispatcher, AutomationRun};
use crate::application::dto::{
    AssetIssuesResponse, CanonicalCountsResponse, ComputeOptions, IssueCountsSummary, IssuesResponse,
    IssuesWithSummaryResponse,
};
use crate::application::error::{EngineError, EngineResult};
use crate::domain::asset::AssetType;
use crate::domain::catalog::PillarId;
use crate::domain::repositories::{
    AssetUrlResolver, Capabilities, CapabilityResolver, PageSource, ProductSource, SignalCollector,
    SiteDirectory,
};
use crate::domain::services::asset_scope::{scope_to_asset, scoped_asset_key, AssetIssuesView};
use crate::domain::services::{decorate, detect_issues, summarize, IssueCountFilters, IssueSet};
use crate::domain::severity::IssueSeverity;
use crate::domain::snapshot::SiteSnapshot;
use crate::infrastructure::config::EngineConfig;

/// Read-side collaborators the engine depends on
#[derive(Clone)]
pub struct Collaborators {
    pub sites: Arc<dyn SiteDirectory>,
    pub pages: Arc<dyn PageSource>,
    pub products: Arc<dyn ProductSource>,
    pub signals: Arc<dyn SignalCollector>,
    pub capabilities: Arc<dyn CapabilityResolver>,
    pub asset_urls: Arc<dyn AssetUrlResolver>,
}

impl Collaborators {
    /// Use one store for every read-side role
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: SiteDirectory
            + PageSource
            + ProductSource
            + SignalCollector
            + CapabilityResolver
            + AssetUrlResolver
            + 'static,
    {
        Self {
            sites: store.clone(),
            pages: store.clone(),
            products: store.clone(),
            signals: store.clone(),
            capabilities: store.clone(),
            asset_urls: store,
        }
    }
}

/// Decorated issues plus the caller's capabilities
struct PreparedRun {
    set: IssueSet,
    capabilities: Capabilities,
}

pub struct IssueEngine {
    collaborators: Collaborators,
    automation: Option<AutomationDispatcher>,
    parallel_builders: bool,
}

impl IssueEngine {
    pub fn new(collaborators: Collaborators, config: &EngineConfig) -> Self {
        Self {
            collaborators,
            automation: None,
            parallel_builders: config.engine.parallel_builders,
        }
    }

    pub fn with_automation(mut self, dispatcher: AutomationDispatcher) -> Self {
        self.automation = Some(dispatcher);
        self
    }

    async fn authorize(&self, site_id: &str, actor_id: &str) -> EngineResult<()> {
        if self.collaborators.sites.find_site(site_id).await?.is_none() {
            return Err(EngineError::SiteNotFound {
                site_id: site_id.to_string(),
            });
        }
        if !self.collaborators.sites.is_member(site_id, actor_id).await? {
            return Err(EngineError::AccessDenied {
                site_id: site_id.to_string(),
                actor_id: actor_id.to_string(),
            });
        }
        Ok(())
    }

    async fn prepare(&self, site_id: &str, actor_id: &str) -> EngineResult<PreparedRun> {
        self.authorize(site_id, actor_id).await?;

        let c = &self.collaborators;
        let (pages, products, signals, capabilities) = tokio::try_join!(
            c.pages.list_pages(site_id),
            c.products.list_products(site_id),
            c.signals.collect_signals(site_id),
            c.capabilities.resolve_capabilities(site_id, actor_id),
        )?;
        debug!(pages = pages.len(), products = products.len(), "📥 Snapshot loaded");

        let snapshot = SiteSnapshot::new(site_id, pages, products, signals);
        let parallel = self.parallel_builders;
        let detected = tokio::task::spawn_blocking(move || detect_issues(&snapshot, parallel))
            .await
            .map_err(|e| anyhow!("Detection task failed: {}", e))?;

        let set = decorate(detected, &capabilities);
        Ok(PreparedRun { set, capabilities })
    }

    fn dispatch_automation(&self, site_id: &str, actor_id: &str, run: &PreparedRun) {
        let Some(dispatcher) = &self.automation else {
            return;
        };
        if !run.capabilities.can_generate_drafts {
            debug!("Caller cannot generate drafts, skipping automation");
            return;
        }
        let items = automation_candidates(&run.set, dispatcher.max_items());
        if items.is_empty() {
            return;
        }
        dispatcher.enqueue(AutomationRun {
            site_id: site_id.to_string(),
            actor_id: actor_id.to_string(),
            items,
        });
    }

    /// Decorated issue list. With side effects enabled, AI-fixable products
    /// are handed to automation without waiting for it.
    #[instrument(name = "compute_issues", skip(self, options), fields(run_id = %Uuid::new_v4()))]
    pub async fn compute_issues(
        &self,
        site_id: &str,
        actor_id: &str,
        options: ComputeOptions,
    ) -> EngineResult<IssuesResponse> {
        let run = self.prepare(site_id, actor_id).await?;
        if options.side_effects {
            self.dispatch_automation(site_id, actor_id, &run);
        }
        info!(issues = run.set.issues.len(), side_effects = options.side_effects, "✅ Issues computed");
        Ok(IssuesResponse {
            site_id: site_id.to_string(),
            generated_at: Utc::now(),
            issues: run.set.issues,
        })
    }

    /// Per-issue tallies; always read-only
    #[instrument(name = "compute_counts_summary", skip(self), fields(run_id = %Uuid::new_v4()))]
    pub async fn compute_counts_summary(&self, site_id: &str, actor_id: &str) -> EngineResult<IssueCountsSummary> {
        let run = self.prepare(site_id, actor_id).await?;
        let issues = &run.set.issues;
        let by_severity = |s: IssueSeverity| issues.iter().filter(|i| i.severity == s).count();

        let mut by_pillar: BTreeMap<PillarId, usize> = PillarId::ALL.into_iter().map(|p| (p, 0)).collect();
        for issue in issues {
            *by_pillar.entry(issue.pillar_id).or_default() += 1;
        }

        let summary = IssueCountsSummary {
            site_id: site_id.to_string(),
            generated_at: Utc::now(),
            total_issues: issues.len(),
            critical: by_severity(IssueSeverity::Critical),
            warning: by_severity(IssueSeverity::Warning),
            info: by_severity(IssueSeverity::Info),
            actionable_now: issues.iter().filter(|i| i.actionable_now()).count(),
            by_pillar,
        };
        info!(total = summary.total_issues, critical = summary.critical, "📊 Counts summary computed");
        Ok(summary)
    }

    /// Canonical triplets with breakdowns; read-only
    #[instrument(name = "compute_canonical_counts", skip(self, filters), fields(run_id = %Uuid::new_v4()))]
    pub async fn compute_canonical_counts_summary(
        &self,
        site_id: &str,
        actor_id: &str,
        filters: Option<&IssueCountFilters>,
    ) -> EngineResult<CanonicalCountsResponse> {
        let run = self.prepare(site_id, actor_id).await?;
        let filters = filters.cloned().unwrap_or_default();
        let summary = summarize(&run.set, &filters)?;
        info!(
            issue_types = summary.detected.issue_types_count,
            affected = summary.detected.affected_items_count,
            actionable = summary.detected.actionable_now_count,
            "📊 Canonical counts computed"
        );
        Ok(CanonicalCountsResponse {
            site_id: site_id.to_string(),
            generated_at: Utc::now(),
            summary,
        })
    }

    /// Issues touching one asset. An unknown asset yields an empty result.
    #[instrument(name = "compute_asset_issues", skip(self, filters), fields(run_id = %Uuid::new_v4()))]
    pub async fn compute_asset_issues(
        &self,
        site_id: &str,
        actor_id: &str,
        asset_type: AssetType,
        asset_id: &str,
        filters: Option<&IssueCountFilters>,
    ) -> EngineResult<AssetIssuesResponse> {
        let run = self.prepare(site_id, actor_id).await?;

        let resolved_url = match asset_type {
            AssetType::Products => None,
            AssetType::Pages | AssetType::Collections => {
                self.collaborators.asset_urls.resolve_asset_url(site_id, asset_id).await?
            }
        };
        let view = match scoped_asset_key(asset_type, asset_id, resolved_url.as_deref()) {
            Some(key) => scope_to_asset(&run.set, asset_type, &key, &filters.cloned().unwrap_or_default()),
            None => {
                debug!("Asset could not be resolved, returning empty view");
                AssetIssuesView::empty()
            }
        };

        info!(issues = view.issues.len(), "🔎 Asset issues computed");
        Ok(AssetIssuesResponse {
            site_id: site_id.to_string(),
            asset_type,
            asset_id: asset_id.to_string(),
            generated_at: Utc::now(),
            issues: view.issues,
            counts: view.counts,
        })
    }

    /// Full issue list plus the canonical summary. A failing summary is
    /// reported through `summary_unavailable` instead of failing the call.
    #[instrument(name = "compute_issues_with_summary", skip(self, filters), fields(run_id = %Uuid::new_v4()))]
    pub async fn compute_issues_with_summary(
        &self,
        site_id: &str,
        actor_id: &str,
        filters: Option<&IssueCountFilters>,
    ) -> EngineResult<IssuesWithSummaryResponse> {
        let run = self.prepare(site_id, actor_id).await?;
        Ok(combine(site_id, run.set, &filters.cloned().unwrap_or_default()))
    }
}

fn combine(site_id: &str, set: IssueSet, filters: &IssueCountFilters) -> IssuesWithSummaryResponse {
    let (summary, summary_unavailable) = match summarize(&set, filters) {
        Ok(summary) => (Some(summary), false),
        Err(e) => {
            warn!(site_id = %site_id, error = %e, "⚠️ Canonical summary unavailable, returning issues only");
            (None, true)
        }
    };
    IssuesWithSummaryResponse {
        site_id: site_id.to_string(),
        generated_at: Utc::now(),
        issues: set.issues,
        summary,
        summary_unavailable,
    }
}
