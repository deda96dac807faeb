//! Response payloads returned by the issue engine
//!
//! All payloads serialize camelCase. Evidence maps never appear here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::PillarId;
use crate::domain::issue::{CanonicalCountTriplet, Issue};
use crate::domain::services::CanonicalIssueCountsSummary;

// ============================================================================
// Request options
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeOptions {
    /// When false the computation is read-only and never triggers automation
    pub side_effects: bool,
}

impl ComputeOptions {
    pub fn read_only() -> Self {
        Self { side_effects: false }
    }

    pub fn with_side_effects() -> Self {
        Self { side_effects: true }
    }
}

/// Read-only unless side effects are asked for
impl Default for ComputeOptions {
    fn default() -> Self {
        Self::read_only()
    }
}

// ============================================================================
// Issue list
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuesResponse {
    pub site_id: String,
    pub generated_at: DateTime<Utc>,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuesWithSummaryResponse {
    pub site_id: String,
    pub generated_at: DateTime<Utc>,
    pub issues: Vec<Issue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<CanonicalIssueCountsSummary>,
    /// Set when the summary failed; the issue list is still complete
    #[serde(default)]
    pub summary_unavailable: bool,
}

// ============================================================================
// Summaries
// ============================================================================

/// Per-issue tallies for dashboard badges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCountsSummary {
    pub site_id: String,
    pub generated_at: DateTime<Utc>,
    pub total_issues: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub actionable_now: usize,
    pub by_pillar: BTreeMap<PillarId, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalCountsResponse {
    pub site_id: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: CanonicalIssueCountsSummary,
}

// ============================================================================
// Asset scope
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIssuesResponse {
    pub site_id: String,
    pub asset_type: crate::domain::asset::AssetType,
    pub asset_id: String,
    pub generated_at: DateTime<Utc>,
    pub issues: Vec<Issue>,
    pub counts: CanonicalCountTriplet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_read_only() {
        assert_eq!(ComputeOptions::default(), ComputeOptions::read_only());
        assert!(!ComputeOptions::default().side_effects);
        assert!(ComputeOptions::with_side_effects().side_effects);
    }
}
