//! End-to-end tests for the issue engine over in-memory collaborators
use std::sync::Arc;

use storefront_issues_lib::application::{AutomationDispatcher, Collaborators, ComputeOptions, IssueEngine};
use storefront_issues_lib::domain::repositories::Capabilities;
use storefront_issues_lib::domain::{AssetType, IssueSeverity, PageRecord, PillarId, ProductRecord, SignalSet};
use storefront_issues_lib::infrastructure::config::AutomationConfig;
use storefront_issues_lib::infrastructure::{EngineConfig, InMemoryStore, LoggingAutomationTrigger, SiteFixture};
use storefront_issues_lib::{EngineError, IssueCountFilters};

const SITE: &str = "site-1";
const OWNER: &str = "owner";
const VIEWER: &str = "viewer";

fn bare_products(n: usize) -> Vec<ProductRecord> {
    (0..n)
        .map(|i| {
            let mut p = ProductRecord::new(format!("p{i}"), format!("Product {i}"));
            p.site_id = SITE.to_string();
            p
        })
        .collect()
}

fn fixture(products: Vec<ProductRecord>) -> SiteFixture {
    let mut site = SiteFixture::new(SITE, "shop.test")
        .with_member(OWNER, Capabilities::all())
        .with_member(VIEWER, Capabilities::none());
    site.products = products;
    site
}

fn engine(site: SiteFixture) -> IssueEngine {
    let store = Arc::new(InMemoryStore::new([site]));
    IssueEngine::new(Collaborators::from_store(store), &EngineConfig::default())
}

#[tokio::test]
async fn unknown_site_is_not_found() {
    let engine = engine(fixture(vec![]));
    let err = engine
        .compute_issues("missing", OWNER, ComputeOptions::read_only())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::SiteNotFound { .. }));
}

#[tokio::test]
async fn non_member_is_denied() {
    let engine = engine(fixture(bare_products(3)));
    let err = engine.compute_counts_summary(SITE, "stranger").await.unwrap_err();
    assert!(matches!(err, EngineError::AccessDenied { .. }));
}

#[tokio::test]
async fn failing_backend_surfaces_as_collaborator_error() {
    let mut site = fixture(bare_products(3));
    site.unavailable = true;
    let err = engine(site)
        .compute_canonical_counts_summary(SITE, OWNER, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Collaborator(_)));
}

#[tokio::test]
async fn empty_site_has_no_issues() {
    let engine = engine(fixture(vec![]));
    let response = engine
        .compute_issues(SITE, OWNER, ComputeOptions::read_only())
        .await
        .unwrap();
    assert!(response.issues.is_empty());

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["issues"], serde_json::json!([]));

    let canonical = engine.compute_canonical_counts_summary(SITE, OWNER, None).await.unwrap();
    assert_eq!(canonical.summary.detected.issue_types_count, 0);
    assert_eq!(canonical.summary.by_pillar.len(), PillarId::ALL.len());
}

#[tokio::test]
async fn missing_seo_titles_are_critical_with_exact_counts() {
    let engine = engine(fixture(bare_products(10)));
    let response = engine
        .compute_issues(SITE, OWNER, ComputeOptions::read_only())
        .await
        .unwrap();

    let issue = response
        .issues
        .iter()
        .find(|i| i.type_key() == "missing_seo_title")
        .expect("missing_seo_title detected");
    assert_eq!(issue.severity, IssueSeverity::Critical);
    assert_eq!(issue.count, 10);
    let counts = issue.asset_type_counts.unwrap();
    assert_eq!((counts.products, counts.pages, counts.collections), (10, 0, 0));
    assert_eq!(issue.is_actionable_now, Some(true));
}

#[tokio::test]
async fn asset_scope_counts_one_affected_item() {
    let engine = engine(fixture(bare_products(10)));
    let response = engine
        .compute_asset_issues(SITE, OWNER, AssetType::Products, "p3", None)
        .await
        .unwrap();

    assert!(response.issues.iter().any(|i| i.type_key() == "missing_seo_title"));
    assert_eq!(response.counts.issue_types_count, response.issues.len());
    assert_eq!(response.counts.affected_items_count, 1);
    assert_eq!(response.counts.actionable_now_count, 1);
}

#[tokio::test]
async fn unknown_asset_yields_empty_view() {
    let engine = engine(fixture(bare_products(4)));
    let response = engine
        .compute_asset_issues(SITE, OWNER, AssetType::Pages, "no-such-page", None)
        .await
        .unwrap();
    assert!(response.issues.is_empty());
    assert_eq!(response.counts.affected_items_count, 0);
}

#[tokio::test]
async fn page_assets_resolve_through_their_url() {
    let about = "https://shop.test/pages/about";
    let mut site = fixture(vec![]);
    site.pages = vec![PageRecord::new(about), PageRecord::new("https://shop.test/pages/faq")];
    site.asset_urls.insert("page-about".into(), about.into());

    let response = engine(site)
        .compute_asset_issues(SITE, OWNER, AssetType::Pages, "page-about", None)
        .await
        .unwrap();
    assert!(response.issues.iter().any(|i| i.type_key() == "missing_page_metadata"));
    assert_eq!(response.counts.affected_items_count, 1);
}

#[tokio::test]
async fn viewer_without_capabilities_has_nothing_actionable() {
    let engine = engine(fixture(bare_products(10)));
    let response = engine
        .compute_issues(SITE, VIEWER, ComputeOptions::read_only())
        .await
        .unwrap();
    assert!(!response.issues.is_empty());
    assert!(response.issues.iter().all(|i| i.is_actionable_now == Some(false)));

    let counts = engine.compute_counts_summary(SITE, VIEWER).await.unwrap();
    assert_eq!(counts.actionable_now, 0);

    let canonical = engine.compute_canonical_counts_summary(SITE, VIEWER, None).await.unwrap();
    assert_eq!(canonical.summary.detected.actionable_now_count, 0);
    assert_eq!(canonical.summary.actionable.issue_types_count, 0);
}

#[tokio::test]
async fn counts_summary_matches_issue_list() {
    let mut products = bare_products(6);
    products[0].price = Some(12.0);
    let engine = engine(fixture(products));

    let issues = engine
        .compute_issues(SITE, OWNER, ComputeOptions::read_only())
        .await
        .unwrap()
        .issues;
    let counts = engine.compute_counts_summary(SITE, OWNER).await.unwrap();

    assert_eq!(counts.total_issues, issues.len());
    assert_eq!(counts.critical + counts.warning + counts.info, issues.len());
    assert_eq!(counts.by_pillar.values().sum::<usize>(), issues.len());
    assert_eq!(
        counts.actionable_now,
        issues.iter().filter(|i| i.actionable_now()).count()
    );
}

#[tokio::test]
async fn canonical_summary_deduplicates_products_across_issues() {
    let engine = engine(fixture(bare_products(5)));
    let canonical = engine.compute_canonical_counts_summary(SITE, OWNER, None).await.unwrap();
    let summary = canonical.summary;

    assert!(summary.detected.issue_types_count > 1);
    // Every product-scoped detector fires on the same five products
    assert_eq!(summary.detected.affected_items_count, 5);
    assert_eq!(summary.actionable.affected_items_count, summary.detected.actionable_now_count);
}

#[tokio::test]
async fn filters_narrow_the_canonical_summary() {
    let engine = engine(fixture(bare_products(5)));
    let filters = IssueCountFilters::parse(Some("fix_metadata"), Some("products"), None, None).unwrap();
    let canonical = engine
        .compute_canonical_counts_summary(SITE, OWNER, Some(&filters))
        .await
        .unwrap();

    // missing_seo_title, missing_seo_description and weak_titles
    assert_eq!(canonical.summary.detected.issue_types_count, 3);
    assert_eq!(canonical.summary.filters, filters);
}

#[tokio::test]
async fn issues_with_summary_keeps_full_list() {
    let engine = engine(fixture(bare_products(5)));
    let filters = IssueCountFilters::new().with_severity(IssueSeverity::Info);
    let response = engine
        .compute_issues_with_summary(SITE, OWNER, Some(&filters))
        .await
        .unwrap();

    let all = engine
        .compute_issues(SITE, OWNER, ComputeOptions::read_only())
        .await
        .unwrap()
        .issues;
    assert_eq!(response.issues, all);
    assert!(!response.summary_unavailable);
    let summary = response.summary.unwrap();
    assert!(summary.detected.issue_types_count <= all.len());
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let mut products = bare_products(8);
    products[2].description = Some("Hand-thrown stoneware mug, dishwasher safe.".into());
    let mut site = fixture(products);
    site.signals = SignalSet {
        crawl_health: Some(0.2),
        ..SignalSet::default()
    };
    let engine = engine(site);

    let first = engine
        .compute_issues(SITE, OWNER, ComputeOptions::read_only())
        .await
        .unwrap();
    let second = engine
        .compute_issues(SITE, OWNER, ComputeOptions::read_only())
        .await
        .unwrap();
    assert_eq!(first.issues, second.issues);

    let a = engine.compute_canonical_counts_summary(SITE, OWNER, None).await.unwrap();
    let b = engine.compute_canonical_counts_summary(SITE, OWNER, None).await.unwrap();
    assert_eq!(a.summary, b.summary);
}

#[tokio::test]
async fn signal_issue_is_store_wide() {
    let mut site = fixture(vec![]);
    site.signals = SignalSet {
        crawl_health: Some(0.2),
        ..SignalSet::default()
    };
    let engine = engine(site);

    let issues = engine
        .compute_issues(SITE, OWNER, ComputeOptions::read_only())
        .await
        .unwrap()
        .issues;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].type_key(), "poor_crawl_health");
    assert_eq!(issues[0].severity, IssueSeverity::Critical);
    assert_eq!(issues[0].is_actionable_now, Some(false));

    let canonical = engine.compute_canonical_counts_summary(SITE, OWNER, None).await.unwrap();
    assert_eq!(canonical.summary.detected.affected_items_count, 1);
    assert_eq!(canonical.summary.detected.actionable_now_count, 0);
}

async fn run_with_automation(options: ComputeOptions, actor: &str, products: usize) -> Vec<(String, String)> {
    let trigger = Arc::new(LoggingAutomationTrigger::new());
    let (dispatcher, worker) = AutomationDispatcher::spawn(trigger.clone(), &AutomationConfig::default());
    let engine = engine(fixture(bare_products(products))).with_automation(dispatcher);

    engine.compute_issues(SITE, actor, options).await.unwrap();
    drop(engine);
    worker.await.unwrap();
    trigger.triggered()
}

#[tokio::test]
async fn read_only_runs_trigger_nothing() {
    let triggered = run_with_automation(ComputeOptions::read_only(), OWNER, 5).await;
    assert!(triggered.is_empty());
}

#[tokio::test]
async fn default_options_trigger_nothing() {
    let triggered = run_with_automation(ComputeOptions::default(), OWNER, 5).await;
    assert!(triggered.is_empty());
}

#[tokio::test]
async fn side_effects_trigger_a_capped_batch() {
    let triggered = run_with_automation(ComputeOptions::with_side_effects(), OWNER, 30).await;
    assert_eq!(triggered.len(), 20);
    assert!(triggered.iter().all(|(_, reason)| reason.starts_with("issue_detected:")));

    let mut ids: Vec<_> = triggered.iter().map(|(id, _)| id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn viewers_never_trigger_automation() {
    let triggered = run_with_automation(ComputeOptions::with_side_effects(), VIEWER, 5).await;
    assert!(triggered.is_empty());
}

#[test]
fn invalid_filter_values_are_rejected() {
    let err = IssueCountFilters::parse(None, Some("variants"), None, None).unwrap_err();
    let engine_err: EngineError = err.into();
    assert!(matches!(engine_err, EngineError::InvalidFilter(_)));
}
