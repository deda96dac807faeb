//! Single-asset view over a decorated issue set

use serde::{Deserialize, Serialize};

use crate::domain::asset::{product_key, url_key, AssetType};
use crate::domain::issue::{CanonicalCountTriplet, Issue};
use crate::domain::services::canonical_counts::{apply_filters, IssueCountFilters};
use crate::domain::services::evidence::IssueSet;

/// Issues touching one asset, with a triplet scoped to that asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIssuesView {
    pub issues: Vec<Issue>,
    pub counts: CanonicalCountTriplet,
}

impl AssetIssuesView {
    /// Well-shaped result for an asset that could not be resolved
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Composite key of an asset: product ids map directly, pages and
/// collections go through their resolved URL.
pub fn scoped_asset_key(asset_type: AssetType, asset_id: &str, resolved_url: Option<&str>) -> Option<String> {
    match asset_type {
        AssetType::Products => Some(product_key(asset_id)),
        AssetType::Pages | AssetType::Collections => resolved_url.map(url_key),
    }
}

/// Narrow to issues that count this asset type and list this asset.
///
/// Filters apply before narrowing. The scoped triplet counts at most the
/// one asset.
pub fn scope_to_asset(
    set: &IssueSet,
    asset_type: AssetType,
    asset_key: &str,
    filters: &IssueCountFilters,
) -> AssetIssuesView {
    let filtered = apply_filters(set, filters);
    let issues: Vec<Issue> = filtered
        .issues
        .iter()
        .filter(|issue| issue.scoped_count(asset_type) > 0 && filtered.evidence.contains(issue, asset_key))
        .cloned()
        .collect();

    let counts = CanonicalCountTriplet {
        issue_types_count: issues.len(),
        affected_items_count: usize::from(!issues.is_empty()),
        actionable_now_count: usize::from(issues.iter().any(Issue::actionable_now)),
    };
    AssetIssuesView { issues, counts }
}
