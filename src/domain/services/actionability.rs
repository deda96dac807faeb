//! Actionability decoration
//!
//! Runs exactly once per computation, after detection. Sets
//! `is_actionable_now` from the issue's fix pathway and the caller's
//! capabilities, and back-fills `asset_type_counts` for issues that were
//! built without them. Evidence is carried over untouched.

use crate::domain::asset::{classify_url, AssetType};
use crate::domain::catalog::{is_in_product_fixable, Actionability};
use crate::domain::issue::{AssetTypeCounts, Issue};
use crate::domain::repositories::Capabilities;
use crate::domain::services::evidence::IssueSet;

/// Fixable in-product, either by type or by a declared ready fix
pub fn is_allow_listed(issue: &Issue) -> bool {
    is_in_product_fixable(issue.type_key()) || (issue.fix_ready && issue.fix_type.is_some())
}

pub fn is_actionable_now(issue: &Issue, capabilities: &Capabilities) -> bool {
    is_allow_listed(issue)
        && issue.actionability != Actionability::Informational
        && capabilities.any()
}

/// Split `count` units between pages and collections by the preview mix
fn split_pages_collections(urls: &[String], count: usize) -> (usize, usize) {
    let (pages, collections) = urls.iter().fold((0usize, 0usize), |(p, c), url| match classify_url(url) {
        AssetType::Pages => (p + 1, c),
        AssetType::Collections => (p, c + 1),
        AssetType::Products => (p, c),
    });
    if pages + collections == 0 {
        return (count, 0);
    }
    let ratio = pages as f64 / (pages + collections) as f64;
    let to_pages = ((ratio * count as f64).round() as usize).min(count);
    (to_pages, count - to_pages)
}

/// Per-type counts derived from preview arrays; always sums to `count`
/// unless the issue has no previews at all.
pub fn backfill_asset_type_counts(issue: &Issue) -> AssetTypeCounts {
    let has_products = !issue.affected_products.is_empty();
    let has_urls = !issue.affected_pages.is_empty();

    match (has_products, has_urls) {
        (false, false) => AssetTypeCounts::default(),
        (true, false) => AssetTypeCounts::new(issue.count, 0, 0),
        (false, true) => {
            let (pages, collections) = split_pages_collections(&issue.affected_pages, issue.count);
            AssetTypeCounts::new(0, pages, collections)
        }
        (true, true) => {
            let products = issue.count.min(issue.affected_products.len());
            let (pages, collections) =
                split_pages_collections(&issue.affected_pages, issue.count - products);
            AssetTypeCounts::new(products, pages, collections)
        }
    }
}

/// Single decoration pass
pub fn decorate(set: IssueSet, capabilities: &Capabilities) -> IssueSet {
    let IssueSet { issues, evidence } = set;
    let issues = issues
        .into_iter()
        .map(|mut issue| {
            issue.is_actionable_now = Some(is_actionable_now(&issue, capabilities));
            if issue.asset_type_counts.is_none() {
                issue.asset_type_counts = Some(backfill_asset_type_counts(&issue));
            }
            issue
        })
        .collect();
    IssueSet { issues, evidence }
}
