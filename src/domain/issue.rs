//! Issue model and canonical count types
//!
//! `Issue` is the serialized contract. The uncapped evidence backing exact
//! distinct-asset counts is not part of it; see
//! [`crate::domain::services::evidence::EvidenceMap`].

use serde::{Deserialize, Serialize};

use crate::domain::asset::AssetType;
use crate::domain::catalog::{
    Actionability, FixCost, FixType, IssueCategory, IssueDefinition, PillarId,
};
use crate::domain::severity::IssueSeverity;

/// Maximum number of ids/urls kept in preview arrays
pub const ISSUE_PREVIEW_LIMIT: usize = 20;

/// Per-asset-type instance counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTypeCounts {
    pub products: usize,
    pub pages: usize,
    pub collections: usize,
}

impl AssetTypeCounts {
    pub fn new(products: usize, pages: usize, collections: usize) -> Self {
        Self {
            products,
            pages,
            collections,
        }
    }

    pub fn get(&self, asset_type: AssetType) -> usize {
        match asset_type {
            AssetType::Products => self.products,
            AssetType::Pages => self.pages,
            AssetType::Collections => self.collections,
        }
    }

    pub fn increment(&mut self, asset_type: AssetType) {
        match asset_type {
            AssetType::Products => self.products += 1,
            AssetType::Pages => self.pages += 1,
            AssetType::Collections => self.collections += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.products + self.pages + self.collections
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

/// A detected defect category with preview evidence and routing hints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    pub title: String,
    pub description: String,
    pub why_it_matters: String,
    pub severity: IssueSeverity,
    pub count: usize,
    pub affected_products: Vec<String>,
    pub affected_pages: Vec<String>,
    pub pillar_id: PillarId,
    pub category: IssueCategory,
    pub actionability: Actionability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type_counts: Option<AssetTypeCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_type: Option<FixType>,
    #[serde(default)]
    pub fix_ready: bool,
    #[serde(default)]
    pub ai_fixable: bool,
    pub fix_cost: FixCost,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_actionable_now: Option<bool>,
}

impl Issue {
    /// Start an issue from its registry definition
    pub fn from_definition(
        def: &IssueDefinition,
        severity: IssueSeverity,
        count: usize,
        description: String,
    ) -> Self {
        Self {
            id: def.issue_type.to_string(),
            issue_type: Some(def.issue_type.to_string()),
            title: def.title.to_string(),
            description,
            why_it_matters: def.why_it_matters.to_string(),
            severity,
            count,
            affected_products: Vec::new(),
            affected_pages: Vec::new(),
            pillar_id: def.pillar,
            category: def.category,
            actionability: def.actionability,
            asset_type_counts: None,
            fix_type: def.fix_type,
            fix_ready: def.fix_ready,
            ai_fixable: def.ai_fixable,
            fix_cost: def.fix_cost,
            primary_product_id: None,
            is_actionable_now: None,
        }
    }

    /// Issue type, defaulting to the id
    pub fn type_key(&self) -> &str {
        self.issue_type.as_deref().unwrap_or(&self.id)
    }

    /// Fill capped preview arrays from uncapped member lists
    pub fn with_previews(mut self, product_ids: &[String], urls: &[String]) -> Self {
        self.affected_products = product_ids.iter().take(ISSUE_PREVIEW_LIMIT).cloned().collect();
        self.affected_pages = urls.iter().take(ISSUE_PREVIEW_LIMIT).cloned().collect();
        self.primary_product_id = self.affected_products.first().cloned();
        self
    }

    pub fn with_asset_type_counts(mut self, counts: AssetTypeCounts) -> Self {
        self.asset_type_counts = Some(counts);
        self
    }

    pub fn actionable_now(&self) -> bool {
        self.is_actionable_now.unwrap_or(false)
    }

    pub fn scoped_count(&self, asset_type: AssetType) -> usize {
        self.asset_type_counts.map_or(0, |c| c.get(asset_type))
    }
}

/// Canonical three-number summary backing every displayed count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalCountTriplet {
    pub issue_types_count: usize,
    pub affected_items_count: usize,
    pub actionable_now_count: usize,
}

/// Detected and actionable triplets computed over the same issue subset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripletPair {
    pub detected: CanonicalCountTriplet,
    pub actionable: CanonicalCountTriplet,
}
