//! Builder registry and detection pipeline
//!
//! Builders are pure and independent, so they can run sequentially or on a
//! rayon fan-out. Output is always collected in registry order.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::catalog::issue_types;
use crate::domain::services::evidence::{DetectedIssue, IssueSet};
use crate::domain::services::{answer_quality, issue_builders, signal_builders};
use crate::domain::snapshot::SiteSnapshot;

pub type BuildFn = fn(&SiteSnapshot) -> Option<DetectedIssue>;

/// A named single-issue detector
#[derive(Clone, Copy)]
pub struct IssueBuilder {
    pub issue_type: &'static str,
    pub build: BuildFn,
}

impl std::fmt::Debug for IssueBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueBuilder").field("issue_type", &self.issue_type).finish()
    }
}

const fn builder(issue_type: &'static str, build: BuildFn) -> IssueBuilder {
    IssueBuilder { issue_type, build }
}

/// Every single-issue detector, in output order
pub const BUILDERS: &[IssueBuilder] = &[
    builder(issue_types::MISSING_SEO_TITLE, issue_builders::missing_seo_title),
    builder(issue_types::MISSING_SEO_DESCRIPTION, issue_builders::missing_seo_description),
    builder(issue_types::WEAK_TITLES, issue_builders::weak_titles),
    builder(issue_types::MISSING_PAGE_METADATA, issue_builders::missing_page_metadata),
    builder(issue_types::MISSING_H1, issue_builders::missing_h1),
    builder(issue_types::THIN_CONTENT, issue_builders::thin_content),
    builder(issue_types::DUPLICATE_PRODUCT_CONTENT, issue_builders::duplicate_product_content),
    builder(issue_types::MISSING_ANSWER_CONTENT, issue_builders::missing_answer_content),
    builder(issue_types::MISSING_PRODUCT_IMAGES, issue_builders::missing_product_images),
    builder(issue_types::MISSING_PRICE, issue_builders::missing_price),
    builder(issue_types::MISSING_CATEGORY, issue_builders::missing_category),
    builder(issue_types::RENDER_BLOCKING_RESOURCES, issue_builders::render_blocking_resources),
    builder(issue_types::SLOW_RESPONSE, issue_builders::slow_response),
    builder(issue_types::EXCESSIVE_PAGE_WEIGHT, issue_builders::excessive_page_weight),
    builder(issue_types::MOBILE_RENDERING_RISK, issue_builders::mobile_rendering_risk),
    builder(issue_types::HTTP_ERRORS, issue_builders::http_errors),
    builder(issue_types::WEAK_ENTITY_COVERAGE, signal_builders::weak_entity_coverage),
    builder(issue_types::INDEXABILITY_GAPS, signal_builders::indexability_gaps),
    builder(issue_types::POOR_CRAWL_HEALTH, signal_builders::poor_crawl_health),
    builder(issue_types::WEAK_ANSWER_SURFACE, signal_builders::weak_answer_surface),
    builder(issue_types::WEAK_BRAND_NAVIGATION, signal_builders::weak_brand_navigation),
];

fn run_builder(builder: &IssueBuilder, snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let detected = (builder.build)(snapshot);
    debug!(
        issue_type = builder.issue_type,
        detected = detected.is_some(),
        count = detected.as_ref().map_or(0, |d| d.issue.count),
        "builder evaluated"
    );
    detected
}

/// Run every builder plus the answer-quality evaluator and attach evidence.
///
/// An answer-quality failure is logged and contributes no issues.
pub fn detect_issues(snapshot: &SiteSnapshot, parallel: bool) -> IssueSet {
    let mut detected: Vec<DetectedIssue> = if parallel {
        BUILDERS
            .par_iter()
            .map(|b| run_builder(b, snapshot))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    } else {
        BUILDERS.iter().filter_map(|b| run_builder(b, snapshot)).collect()
    };

    match answer_quality::evaluate(snapshot) {
        Ok(answer_issues) => {
            debug!(count = answer_issues.len(), "answer quality evaluated");
            detected.extend(answer_issues);
        }
        Err(e) => {
            warn!(site_id = %snapshot.site_id, error = %e, "⚠️ Answer quality evaluation failed, skipping answer issues");
        }
    }

    IssueSet::from_detected(detected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::{AnswerBlock, PageRecord, ProductRecord, SignalSet};
    use std::collections::HashSet;

    fn messy_snapshot() -> SiteSnapshot {
        let products: Vec<ProductRecord> = (0..6)
            .map(|i| {
                let mut p = ProductRecord::new(format!("p{i}"), "Mug");
                if i % 2 == 0 {
                    p.answer_blocks.push(AnswerBlock {
                        question_id: "what_is_it".into(),
                        answer_text: "Great!".into(),
                    });
                }
                p
            })
            .collect();
        let mut pages: Vec<PageRecord> = (0..4).map(|i| PageRecord::new(format!("https://s.test/pages/p{i}"))).collect();
        pages[0].status_code = 404;
        let signals = SignalSet {
            crawl_health: Some(0.4),
            ..Default::default()
        };
        SiteSnapshot::new("site-1", pages, products, signals)
    }

    #[test]
    fn registry_has_unique_known_types() {
        let mut seen = HashSet::new();
        for b in BUILDERS {
            assert!(seen.insert(b.issue_type), "duplicate builder {}", b.issue_type);
            assert!(crate::domain::catalog::definition(b.issue_type).is_some());
        }
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let snapshot = messy_snapshot();
        let sequential = detect_issues(&snapshot, false);
        let parallel = detect_issues(&snapshot, true);
        assert_eq!(sequential, parallel);
        assert!(!sequential.is_empty());
        assert_eq!(sequential.evidence.len(), sequential.issues.len());
    }

    #[test]
    fn answer_issues_follow_builder_output() {
        let set = detect_issues(&messy_snapshot(), false);
        let last_builder_pos = set.issues.iter().rposition(|i| !i.id.starts_with("answer_")).unwrap();
        let first_answer_pos = set.issues.iter().position(|i| i.id.starts_with("answer_")).unwrap();
        assert!(first_answer_pos > last_builder_pos);
    }

    #[test]
    fn malformed_answers_only_drop_answer_issues() {
        let mut snapshot = messy_snapshot();
        snapshot.products[0].answer_blocks[0].question_id = String::new();
        let set = detect_issues(&snapshot, false);
        assert!(set.issues.iter().all(|i| !i.id.starts_with("answer_")));
        assert!(set.issues.iter().any(|i| i.id == issue_types::HTTP_ERRORS));
    }

    #[test]
    fn empty_snapshot_yields_no_issues() {
        let snapshot = SiteSnapshot::new("site-1", vec![], vec![], SignalSet::default());
        assert!(detect_issues(&snapshot, true).is_empty());
    }
}
