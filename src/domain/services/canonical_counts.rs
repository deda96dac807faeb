//! Canonical issue counts
//!
//! Every count shown on a dashboard comes from one triplet:
//! issue types, distinct affected assets and distinct actionable assets.
//! Distinct assets are counted over composite keys from the evidence map, so
//! capped preview arrays never cause undercounting and an asset hit by
//! several issues is counted once.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::asset::AssetType;
use crate::domain::catalog::{action_key_for, ActionKey, FilterParseError, PillarId};
use crate::domain::issue::{CanonicalCountTriplet, Issue, TripletPair};
use crate::domain::services::evidence::IssueSet;
use crate::domain::severity::IssueSeverity;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CountsError {
    #[error("Issue '{issue_id}' reached aggregation without actionability decoration")]
    Undecorated { issue_id: String },

    #[error("Issue '{issue_id}' has asset type counts summing to {sum}, expected {count}")]
    AssetCountMismatch {
        issue_id: String,
        count: usize,
        sum: usize,
    },

    #[error("Count reconciliation failed: {0}")]
    Reconciliation(String),
}

/// Pre-aggregation filters; all present filters must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueCountFilters {
    /// Matches any listed key
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub action_keys: Vec<ActionKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_type: Option<AssetType>,
    /// Matches any listed pillar
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pillars: Vec<PillarId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<IssueSeverity>,
}

impl IssueCountFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action_keys(mut self, keys: impl IntoIterator<Item = ActionKey>) -> Self {
        self.action_keys = keys.into_iter().collect();
        self
    }

    pub fn with_scope_type(mut self, scope_type: AssetType) -> Self {
        self.scope_type = Some(scope_type);
        self
    }

    pub fn with_pillars(mut self, pillars: impl IntoIterator<Item = PillarId>) -> Self {
        self.pillars = pillars.into_iter().collect();
        self
    }

    pub fn with_severity(mut self, severity: IssueSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Build filters from comma-separated query values
    pub fn parse(
        action_keys: Option<&str>,
        scope_type: Option<&str>,
        pillars: Option<&str>,
        severity: Option<&str>,
    ) -> Result<Self, FilterParseError> {
        Ok(Self {
            action_keys: split_list(action_keys)?,
            scope_type: scope_type.filter(|s| !s.trim().is_empty()).map(str::parse).transpose()?,
            pillars: split_list(pillars)?,
            severity: severity.filter(|s| !s.trim().is_empty()).map(str::parse).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.action_keys.is_empty()
            && self.scope_type.is_none()
            && self.pillars.is_empty()
            && self.severity.is_none()
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        let action_ok = self.action_keys.is_empty()
            || action_key_for(issue.type_key()).is_some_and(|k| self.action_keys.contains(&k));
        let scope_ok = self.scope_type.is_none_or(|t| issue.scoped_count(t) > 0);
        let pillar_ok = self.pillars.is_empty() || self.pillars.contains(&issue.pillar_id);
        let severity_ok = self.severity.is_none_or(|s| issue.severity == s);
        action_ok && scope_ok && pillar_ok && severity_ok
    }
}

fn split_list<T: std::str::FromStr<Err = FilterParseError>>(
    raw: Option<&str>,
) -> Result<Vec<T>, FilterParseError> {
    raw.map_or(Ok(Vec::new()), |raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    })
}

pub fn apply_filters(set: &IssueSet, filters: &IssueCountFilters) -> IssueSet {
    if filters.is_empty() {
        return set.clone();
    }
    set.filtered(|issue| filters.matches(issue))
}

/// Triplet over a decorated set, optionally restricted to actionable issues
pub fn compute_triplet(set: &IssueSet, only_actionable: bool) -> CanonicalCountTriplet {
    let issues: Vec<&Issue> = set
        .issues
        .iter()
        .filter(|i| !only_actionable || i.actionable_now())
        .collect();

    let mut affected: BTreeSet<String> = BTreeSet::new();
    let mut actionable: BTreeSet<String> = BTreeSet::new();
    for issue in &issues {
        let keys = set.evidence.keys_for(issue);
        if issue.actionable_now() {
            actionable.extend(keys.iter().cloned());
        }
        affected.extend(keys);
    }

    CanonicalCountTriplet {
        issue_types_count: issues.len(),
        affected_items_count: affected.len(),
        actionable_now_count: actionable.len(),
    }
}

pub fn triplet_pair(set: &IssueSet) -> TripletPair {
    TripletPair {
        detected: compute_triplet(set, false),
        actionable: compute_triplet(set, true),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalIssueCountsSummary {
    pub detected: CanonicalCountTriplet,
    pub actionable: CanonicalCountTriplet,
    /// Every known pillar, including empty ones
    pub by_pillar: BTreeMap<PillarId, TripletPair>,
    pub by_severity: BTreeMap<IssueSeverity, TripletPair>,
    pub filters: IssueCountFilters,
}

fn check_decorated(set: &IssueSet) -> Result<(), CountsError> {
    for issue in &set.issues {
        if issue.is_actionable_now.is_none() {
            return Err(CountsError::Undecorated {
                issue_id: issue.id.clone(),
            });
        }
        if let Some(counts) = issue.asset_type_counts {
            if !counts.is_zero() && counts.total() != issue.count {
                return Err(CountsError::AssetCountMismatch {
                    issue_id: issue.id.clone(),
                    count: issue.count,
                    sum: counts.total(),
                });
            }
        }
    }
    Ok(())
}

fn check_reconciled(summary: &CanonicalIssueCountsSummary) -> Result<(), CountsError> {
    let fail = |msg: String| Err(CountsError::Reconciliation(msg));
    let d = summary.detected;
    let a = summary.actionable;

    if d.actionable_now_count > d.affected_items_count {
        return fail(format!(
            "actionable assets {} exceed affected assets {}",
            d.actionable_now_count, d.affected_items_count
        ));
    }
    if a.issue_types_count > d.issue_types_count {
        return fail(format!(
            "actionable issue types {} exceed detected issue types {}",
            a.issue_types_count, d.issue_types_count
        ));
    }
    if a.affected_items_count != d.actionable_now_count {
        return fail(format!(
            "actionable-only affected assets {} differ from detected actionable assets {}",
            a.affected_items_count, d.actionable_now_count
        ));
    }

    let pillar_types: usize = summary.by_pillar.values().map(|p| p.detected.issue_types_count).sum();
    let severity_types: usize = summary.by_severity.values().map(|p| p.detected.issue_types_count).sum();
    if pillar_types != d.issue_types_count || severity_types != d.issue_types_count {
        return fail(format!(
            "breakdowns cover {pillar_types} (pillar) and {severity_types} (severity) issue types, root has {}",
            d.issue_types_count
        ));
    }
    Ok(())
}

/// Root triplets plus per-pillar and per-severity breakdowns of a decorated set
pub fn summarize(
    set: &IssueSet,
    filters: &IssueCountFilters,
) -> Result<CanonicalIssueCountsSummary, CountsError> {
    check_decorated(set)?;
    let filtered = apply_filters(set, filters);
    let root = triplet_pair(&filtered);

    let by_pillar = PillarId::ALL
        .into_iter()
        .map(|pillar| (pillar, triplet_pair(&filtered.filtered(|i| i.pillar_id == pillar))))
        .collect();
    let by_severity = IssueSeverity::ALL
        .into_iter()
        .map(|severity| (severity, triplet_pair(&filtered.filtered(|i| i.severity == severity))))
        .collect();

    let summary = CanonicalIssueCountsSummary {
        detected: root.detected,
        actionable: root.actionable,
        by_pillar,
        by_severity,
        filters: filters.clone(),
    };
    check_reconciled(&summary)?;
    Ok(summary)
}
