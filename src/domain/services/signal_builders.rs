//! Store-wide signal detectors ("lower is worse")
//!
//! Signals are site-level scores in `[0, 1]`. An uncollected signal raises
//! nothing. Every signal issue counts as exactly one store-wide asset.

use crate::domain::catalog::{definition, issue_types};
use crate::domain::issue::Issue;
use crate::domain::services::evidence::{AffectedAssets, DetectedIssue};
use crate::domain::severity::SignalThresholds;
use crate::domain::snapshot::SiteSnapshot;

const WEAK_ENTITY_COVERAGE: SignalThresholds = SignalThresholds::new(0.30, 0.50, 0.70);
const INDEXABILITY_GAPS: SignalThresholds = SignalThresholds::new(0.50, 0.70, 0.90);
const POOR_CRAWL_HEALTH: SignalThresholds = SignalThresholds::new(0.50, 0.70, 0.85);
const WEAK_ANSWER_SURFACE: SignalThresholds = SignalThresholds::new(0.20, 0.40, 0.60);
const WEAK_BRAND_NAVIGATION: SignalThresholds = SignalThresholds::new(0.20, 0.40, 0.60);

fn signal_issue(
    issue_type: &str,
    thresholds: SignalThresholds,
    value: Option<f64>,
    label: &str,
) -> Option<DetectedIssue> {
    let severity = thresholds.classify(value)?;
    let def = definition(issue_type)?;
    let score = value.unwrap_or_default();
    let description = format!(
        "Store-wide {label} score is {:.0}% (healthy at {:.0}% or above).",
        score * 100.0,
        thresholds.info * 100.0
    );
    Some(DetectedIssue::new(
        Issue::from_definition(def, severity, 1, description),
        AffectedAssets::default(),
    ))
}

pub fn weak_entity_coverage(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    signal_issue(
        issue_types::WEAK_ENTITY_COVERAGE,
        WEAK_ENTITY_COVERAGE,
        snapshot.signals.entity_coverage,
        "entity coverage",
    )
}

pub fn indexability_gaps(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    signal_issue(
        issue_types::INDEXABILITY_GAPS,
        INDEXABILITY_GAPS,
        snapshot.signals.indexability,
        "indexability",
    )
}

pub fn poor_crawl_health(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    signal_issue(
        issue_types::POOR_CRAWL_HEALTH,
        POOR_CRAWL_HEALTH,
        snapshot.signals.crawl_health,
        "crawl health",
    )
}

pub fn weak_answer_surface(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    signal_issue(
        issue_types::WEAK_ANSWER_SURFACE,
        WEAK_ANSWER_SURFACE,
        snapshot.signals.answer_surface_presence,
        "answer surface presence",
    )
}

pub fn weak_brand_navigation(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    signal_issue(
        issue_types::WEAK_BRAND_NAVIGATION,
        WEAK_BRAND_NAVIGATION,
        snapshot.signals.brand_navigational_strength,
        "brand navigational strength",
    )
}
