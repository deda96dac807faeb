//! Full-key evidence tracking
//!
//! Preview arrays on an [`Issue`] are capped, so they cannot back exact
//! distinct-asset counts. Each detector hands over its uncapped member lists
//! and the tracker turns them into a deduplicated composite-key set stored
//! next to the issue list, keyed by issue id. The map travels with the
//! issues through decoration and filtering and is never rebuilt from the
//! previews.

use std::collections::{BTreeSet, HashMap};

use crate::domain::asset::{product_key, store_wide_key, url_key, AssetType};
use crate::domain::catalog::definition;
use crate::domain::issue::Issue;

/// Uncapped members reported by a detector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffectedAssets {
    pub product_ids: Vec<String>,
    /// Page and collection URLs
    pub urls: Vec<String>,
}

impl AffectedAssets {
    pub fn products(product_ids: Vec<String>) -> Self {
        Self {
            product_ids,
            urls: Vec::new(),
        }
    }

    pub fn urls(urls: Vec<String>) -> Self {
        Self {
            product_ids: Vec::new(),
            urls,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty() && self.urls.is_empty()
    }
}

/// Detector output before evidence is attached
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedIssue {
    pub issue: Issue,
    pub affected: AffectedAssets,
}

impl DetectedIssue {
    /// Build an issue with previews taken from the uncapped members
    pub fn new(issue: Issue, affected: AffectedAssets) -> Self {
        let issue = issue.with_previews(&affected.product_ids, &affected.urls);
        Self { issue, affected }
    }
}

/// Out-of-band issue id → composite key set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceMap {
    keys: HashMap<String, BTreeSet<String>>,
}

impl EvidenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the full key set for an issue, replacing any previous entry
    pub fn attach(&mut self, issue: &Issue, affected: &AffectedAssets) {
        self.keys.insert(issue.id.clone(), build_full_keys(issue, affected));
    }

    pub fn get(&self, issue_id: &str) -> Option<&BTreeSet<String>> {
        self.keys.get(issue_id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys counted for an issue: full evidence when present, else the capped
    /// previews, else the store-wide pseudo key.
    pub fn keys_for(&self, issue: &Issue) -> BTreeSet<String> {
        match self.keys.get(&issue.id) {
            Some(keys) if !keys.is_empty() => keys.clone(),
            _ => fallback_keys(issue),
        }
    }

    pub fn contains(&self, issue: &Issue, key: &str) -> bool {
        match self.keys.get(&issue.id) {
            Some(keys) if !keys.is_empty() => keys.contains(key),
            _ => fallback_keys(issue).contains(key),
        }
    }

    /// Copy the entries for the given issues only
    pub fn subset<'a>(&self, issues: impl IntoIterator<Item = &'a Issue>) -> EvidenceMap {
        let keys = issues
            .into_iter()
            .filter_map(|issue| self.keys.get(&issue.id).map(|k| (issue.id.clone(), k.clone())))
            .collect();
        EvidenceMap { keys }
    }
}

/// Issues plus their evidence; cloning copies the evidence alongside
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueSet {
    pub issues: Vec<Issue>,
    pub evidence: EvidenceMap,
}

impl IssueSet {
    /// Attach evidence for every detector result
    pub fn from_detected(detected: Vec<DetectedIssue>) -> Self {
        let mut evidence = EvidenceMap::new();
        let mut issues = Vec::with_capacity(detected.len());
        for DetectedIssue { issue, affected } in detected {
            evidence.attach(&issue, &affected);
            issues.push(issue);
        }
        Self { issues, evidence }
    }

    /// Keep issues matching the predicate, carrying their evidence over
    pub fn filtered(&self, mut keep: impl FnMut(&Issue) -> bool) -> IssueSet {
        let issues: Vec<Issue> = self.issues.iter().filter(|i| keep(*i)).cloned().collect();
        let evidence = self.evidence.subset(&issues);
        IssueSet { issues, evidence }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Deduplicated composite keys for a detector's uncapped members
pub fn build_full_keys(issue: &Issue, affected: &AffectedAssets) -> BTreeSet<String> {
    let mut keys: BTreeSet<String> = affected
        .product_ids
        .iter()
        .map(|id| product_key(id))
        .chain(affected.urls.iter().map(|url| url_key(url)))
        .collect();

    if keys.is_empty() && issue.count > 0 {
        keys.insert(store_wide_key(scope_of(issue)));
    }
    keys
}

/// Keys derivable from the capped previews alone
pub fn fallback_keys(issue: &Issue) -> BTreeSet<String> {
    let mut keys: BTreeSet<String> = issue
        .affected_products
        .iter()
        .map(|id| product_key(id))
        .chain(issue.affected_pages.iter().map(|url| url_key(url)))
        .collect();

    if keys.is_empty() {
        keys.insert(store_wide_key(scope_of(issue)));
    }
    keys
}

fn scope_of(issue: &Issue) -> AssetType {
    definition(issue.type_key()).map_or(AssetType::Pages, |d| d.scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::issue_types;
    use crate::domain::issue::ISSUE_PREVIEW_LIMIT;
    use crate::domain::severity::IssueSeverity;

    fn issue(issue_type: &str, count: usize) -> Issue {
        Issue::from_definition(
            definition(issue_type).unwrap(),
            IssueSeverity::Warning,
            count,
            String::new(),
        )
    }

    #[test]
    fn full_keys_are_deduplicated_and_classified() {
        let affected = AffectedAssets {
            product_ids: vec!["p1".into(), "p1".into(), "p2".into()],
            urls: vec![
                "https://s.test/collections/sale".into(),
                "https://s.test/pages/about".into(),
                "https://s.test/pages/about".into(),
            ],
        };
        let keys = build_full_keys(&issue(issue_types::THIN_CONTENT, 4), &affected);
        let expected: BTreeSet<String> = [
            "products:p1",
            "products:p2",
            "collections:https://s.test/collections/sale",
            "pages:https://s.test/pages/about",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn store_wide_issue_gets_single_pseudo_key() {
        let keys = build_full_keys(&issue(issue_types::POOR_CRAWL_HEALTH, 1), &AffectedAssets::default());
        assert_eq!(keys.len(), 1);
        assert!(keys.contains("pages:__store_wide__"));
    }

    #[test]
    fn evidence_outlives_preview_cap() {
        let ids: Vec<String> = (0..50).map(|i| format!("p{i}")).collect();
        let detected = DetectedIssue::new(
            issue(issue_types::MISSING_SEO_TITLE, ids.len()),
            AffectedAssets::products(ids),
        );
        assert_eq!(detected.issue.affected_products.len(), ISSUE_PREVIEW_LIMIT);

        let set = IssueSet::from_detected(vec![detected]);
        let keys = set.evidence.keys_for(&set.issues[0]);
        assert_eq!(keys.len(), 50);
        for preview in &set.issues[0].affected_products {
            assert!(keys.contains(&product_key(preview)));
        }
    }

    #[test]
    fn filtered_set_copies_evidence() {
        let a = DetectedIssue::new(issue(issue_types::MISSING_SEO_TITLE, 1), AffectedAssets::products(vec!["p1".into()]));
        let b = DetectedIssue::new(issue(issue_types::MISSING_PRICE, 1), AffectedAssets::products(vec!["p2".into()]));
        let set = IssueSet::from_detected(vec![a, b]);
        let only_price = set.filtered(|i| i.id == issue_types::MISSING_PRICE);
        assert_eq!(only_price.issues.len(), 1);
        assert_eq!(only_price.evidence.len(), 1);
        assert!(only_price.evidence.contains(&only_price.issues[0], "products:p2"));
    }

    #[test]
    fn missing_evidence_falls_back_to_previews() {
        let mut i = issue(issue_types::MISSING_CATEGORY, 2);
        i.affected_products = vec!["p9".into()];
        let empty = EvidenceMap::new();
        assert!(empty.contains(&i, "products:p9"));
        assert_eq!(empty.keys_for(&i).len(), 1);
    }
}
