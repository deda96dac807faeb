//! Static issue-type registry
//!
//! Every detector looks up its copy and routing metadata here instead of
//! carrying its own, so near-identical detectors cannot drift apart.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::asset::AssetType;

/// Issue type identifiers
pub mod issue_types {
    // Metadata
    pub const MISSING_SEO_TITLE: &str = "missing_seo_title";
    pub const MISSING_SEO_DESCRIPTION: &str = "missing_seo_description";
    pub const WEAK_TITLES: &str = "weak_titles";
    pub const MISSING_PAGE_METADATA: &str = "missing_page_metadata";
    pub const MISSING_H1: &str = "missing_h1";
    // Content
    pub const THIN_CONTENT: &str = "thin_content";
    pub const DUPLICATE_PRODUCT_CONTENT: &str = "duplicate_product_content";
    pub const MISSING_ANSWER_CONTENT: &str = "missing_answer_content";
    // Product data
    pub const MISSING_PRODUCT_IMAGES: &str = "missing_product_images";
    pub const MISSING_PRICE: &str = "missing_price";
    pub const MISSING_CATEGORY: &str = "missing_category";
    // Technical
    pub const RENDER_BLOCKING_RESOURCES: &str = "render_blocking_resources";
    pub const SLOW_RESPONSE: &str = "slow_response";
    pub const EXCESSIVE_PAGE_WEIGHT: &str = "excessive_page_weight";
    pub const MOBILE_RENDERING_RISK: &str = "mobile_rendering_risk";
    pub const HTTP_ERRORS: &str = "http_errors";
    // Signals
    pub const WEAK_ENTITY_COVERAGE: &str = "weak_entity_coverage";
    pub const INDEXABILITY_GAPS: &str = "indexability_gaps";
    pub const POOR_CRAWL_HEALTH: &str = "poor_crawl_health";
    pub const WEAK_ANSWER_SURFACE: &str = "weak_answer_surface";
    pub const WEAK_BRAND_NAVIGATION: &str = "weak_brand_navigation";
    // Answer quality
    pub const ANSWER_MISSING_DIRECT_ANSWER: &str = "answer_missing_direct_answer";
    pub const ANSWER_TOO_VAGUE: &str = "answer_too_vague";
    pub const ANSWER_POOR_STRUCTURE: &str = "answer_poor_structure";
    pub const ANSWER_OVERLY_PROMOTIONAL: &str = "answer_overly_promotional";
    pub const ANSWER_MISSING_EXAMPLES: &str = "answer_missing_examples";
}

/// Types that can be fixed in-product without further routing
pub const IN_PRODUCT_FIXABLE_TYPES: &[&str] = &[
    issue_types::MISSING_SEO_TITLE,
    issue_types::MISSING_SEO_DESCRIPTION,
    issue_types::WEAK_TITLES,
    issue_types::MISSING_PAGE_METADATA,
    issue_types::THIN_CONTENT,
    issue_types::DUPLICATE_PRODUCT_CONTENT,
    issue_types::MISSING_ANSWER_CONTENT,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("Unknown {kind}: '{value}'")]
    UnknownValue { kind: &'static str, value: String },
}

impl FilterParseError {
    pub fn unknown(kind: &'static str, value: &str) -> Self {
        Self::UnknownValue {
            kind,
            value: value.to_string(),
        }
    }
}

/// Navigation pillars used to group issues on dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PillarId {
    MetadataSnippetQuality,
    ContentCommerceSignals,
    MediaAccessibility,
    TechnicalIndexability,
    SearchIntentFit,
    OffsiteSignals,
}

impl PillarId {
    pub const ALL: [PillarId; 6] = [
        PillarId::MetadataSnippetQuality,
        PillarId::ContentCommerceSignals,
        PillarId::MediaAccessibility,
        PillarId::TechnicalIndexability,
        PillarId::SearchIntentFit,
        PillarId::OffsiteSignals,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PillarId::MetadataSnippetQuality => "metadata_snippet_quality",
            PillarId::ContentCommerceSignals => "content_commerce_signals",
            PillarId::MediaAccessibility => "media_accessibility",
            PillarId::TechnicalIndexability => "technical_indexability",
            PillarId::SearchIntentFit => "search_intent_fit",
            PillarId::OffsiteSignals => "offsite_signals",
        }
    }
}

impl fmt::Display for PillarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PillarId {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        PillarId::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| FilterParseError::unknown("pillar", s))
    }
}

/// Fix flow an issue routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKey {
    FixMetadata,
    ImproveContent,
    CompleteProductData,
    FixTechnical,
    AddAnswers,
    MonitorSignals,
}

impl ActionKey {
    pub const ALL: [ActionKey; 6] = [
        ActionKey::FixMetadata,
        ActionKey::ImproveContent,
        ActionKey::CompleteProductData,
        ActionKey::FixTechnical,
        ActionKey::AddAnswers,
        ActionKey::MonitorSignals,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKey::FixMetadata => "fix_metadata",
            ActionKey::ImproveContent => "improve_content",
            ActionKey::CompleteProductData => "complete_product_data",
            ActionKey::FixTechnical => "fix_technical",
            ActionKey::AddAnswers => "add_answers",
            ActionKey::MonitorSignals => "monitor_signals",
        }
    }
}

impl FromStr for ActionKey {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ActionKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| FilterParseError::unknown("action key", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Metadata,
    ContentQuality,
    ProductData,
    Technical,
    AnswerReadiness,
    Signals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actionability {
    Manual,
    Automation,
    Informational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixType {
    AiDraft,
    ManualEdit,
    CatalogUpdate,
    DeveloperFix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixCost {
    Low,
    Medium,
    High,
}

/// Static metadata for one issue type
#[derive(Debug, Clone)]
pub struct IssueDefinition {
    pub issue_type: &'static str,
    pub title: &'static str,
    pub why_it_matters: &'static str,
    pub pillar: PillarId,
    pub category: IssueCategory,
    pub actionability: Actionability,
    pub fix_type: Option<FixType>,
    pub fix_ready: bool,
    pub ai_fixable: bool,
    pub fix_cost: FixCost,
    pub action_key: ActionKey,
    /// Bucket used for the store-wide key when nothing enumerable is affected
    pub scope: AssetType,
}

macro_rules! definition {
    (
        $issue_type:expr, $title:expr, $why:expr,
        $pillar:ident, $category:ident, $actionability:ident,
        $fix_type:expr, $fix_ready:expr, $ai_fixable:expr,
        $fix_cost:ident, $action_key:ident, $scope:ident
    ) => {
        IssueDefinition {
            issue_type: $issue_type,
            title: $title,
            why_it_matters: $why,
            pillar: PillarId::$pillar,
            category: IssueCategory::$category,
            actionability: Actionability::$actionability,
            fix_type: $fix_type,
            fix_ready: $fix_ready,
            ai_fixable: $ai_fixable,
            fix_cost: FixCost::$fix_cost,
            action_key: ActionKey::$action_key,
            scope: AssetType::$scope,
        }
    };
}

use issue_types as t;

static ISSUE_DEFINITIONS: Lazy<Vec<IssueDefinition>> = Lazy::new(|| {
    vec![
        definition!(
            t::MISSING_SEO_TITLE,
            "Products missing SEO titles",
            "Search engines fall back to the raw product name, which rarely matches how shoppers search.",
            MetadataSnippetQuality, Metadata, Automation,
            Some(FixType::AiDraft), true, true, Low, FixMetadata, Products
        ),
        definition!(
            t::MISSING_SEO_DESCRIPTION,
            "Products missing SEO descriptions",
            "Without a meta description the search snippet is improvised from page text and converts worse.",
            MetadataSnippetQuality, Metadata, Automation,
            Some(FixType::AiDraft), true, true, Low, FixMetadata, Products
        ),
        definition!(
            t::WEAK_TITLES,
            "Titles that are too short or too long",
            "Titles outside 30-65 characters are truncated or under-describe the page in results.",
            MetadataSnippetQuality, Metadata, Automation,
            Some(FixType::AiDraft), true, true, Low, FixMetadata, Pages
        ),
        definition!(
            t::MISSING_PAGE_METADATA,
            "Pages missing a title or meta description",
            "Pages without metadata give search engines nothing to build a snippet from.",
            MetadataSnippetQuality, Metadata, Automation,
            Some(FixType::AiDraft), true, true, Low, FixMetadata, Pages
        ),
        definition!(
            t::MISSING_H1,
            "Pages missing a primary heading",
            "The H1 is the strongest on-page statement of what a page is about.",
            MetadataSnippetQuality, Metadata, Manual,
            Some(FixType::ManualEdit), false, false, Low, FixMetadata, Pages
        ),
        definition!(
            t::THIN_CONTENT,
            "Thin product and page content",
            "Pages with very little copy rarely rank and give shoppers too little to decide on.",
            ContentCommerceSignals, ContentQuality, Automation,
            Some(FixType::AiDraft), true, true, Medium, ImproveContent, Pages
        ),
        definition!(
            t::DUPLICATE_PRODUCT_CONTENT,
            "Products sharing duplicate descriptions",
            "Identical copy across products splits ranking signals and hides what makes each product distinct.",
            ContentCommerceSignals, ContentQuality, Automation,
            Some(FixType::AiDraft), true, true, Medium, ImproveContent, Products
        ),
        definition!(
            t::MISSING_ANSWER_CONTENT,
            "Products that cannot answer common buyer questions",
            "Answer engines and shoppers look for direct answers about use, fit and care before buying.",
            SearchIntentFit, AnswerReadiness, Automation,
            Some(FixType::AiDraft), true, true, Medium, AddAnswers, Products
        ),
        definition!(
            t::MISSING_PRODUCT_IMAGES,
            "Products without images",
            "Products with no imagery are excluded from image and shopping surfaces.",
            MediaAccessibility, ProductData, Manual,
            Some(FixType::CatalogUpdate), false, false, Medium, CompleteProductData, Products
        ),
        definition!(
            t::MISSING_PRICE,
            "Products without a valid price",
            "Shopping feeds reject products with no price and shoppers bounce from them.",
            ContentCommerceSignals, ProductData, Manual,
            Some(FixType::CatalogUpdate), false, false, Low, CompleteProductData, Products
        ),
        definition!(
            t::MISSING_CATEGORY,
            "Products without a category or type",
            "Uncategorised products are hard to place in collections, feeds and structured data.",
            ContentCommerceSignals, ProductData, Manual,
            Some(FixType::CatalogUpdate), false, false, Low, CompleteProductData, Products
        ),
        definition!(
            t::RENDER_BLOCKING_RESOURCES,
            "Render-blocking resources",
            "Scripts and styles that block rendering delay first paint on every affected page.",
            TechnicalIndexability, Technical, Manual,
            Some(FixType::DeveloperFix), false, false, High, FixTechnical, Pages
        ),
        definition!(
            t::SLOW_RESPONSE,
            "Slow page responses",
            "Slow responses reduce crawl budget and hurt conversion.",
            TechnicalIndexability, Technical, Manual,
            Some(FixType::DeveloperFix), false, false, High, FixTechnical, Pages
        ),
        definition!(
            t::EXCESSIVE_PAGE_WEIGHT,
            "Excessive page weight",
            "Heavy pages load slowly on mobile networks.",
            TechnicalIndexability, Technical, Manual,
            Some(FixType::DeveloperFix), false, false, Medium, FixTechnical, Pages
        ),
        definition!(
            t::MOBILE_RENDERING_RISK,
            "Mobile rendering risks",
            "Mobile-first indexing evaluates the mobile rendering of each page.",
            TechnicalIndexability, Technical, Manual,
            Some(FixType::DeveloperFix), false, false, Medium, FixTechnical, Pages
        ),
        definition!(
            t::HTTP_ERRORS,
            "Pages returning HTTP errors",
            "Error responses waste crawl budget and break internal links.",
            TechnicalIndexability, Technical, Manual,
            Some(FixType::DeveloperFix), false, false, Medium, FixTechnical, Pages
        ),
        definition!(
            t::WEAK_ENTITY_COVERAGE,
            "Weak entity coverage",
            "Search engines understand the store through the entities its content names consistently.",
            SearchIntentFit, Signals, Informational,
            None, false, false, Medium, MonitorSignals, Pages
        ),
        definition!(
            t::INDEXABILITY_GAPS,
            "Indexability gaps",
            "Pages that cannot be indexed cannot rank.",
            TechnicalIndexability, Signals, Informational,
            None, false, false, Medium, MonitorSignals, Pages
        ),
        definition!(
            t::POOR_CRAWL_HEALTH,
            "Poor crawl health",
            "Crawl failures hide content from search engines.",
            TechnicalIndexability, Signals, Informational,
            None, false, false, Medium, MonitorSignals, Pages
        ),
        definition!(
            t::WEAK_ANSWER_SURFACE,
            "Low answer-surface presence",
            "The store rarely appears where buyers ask questions about its products.",
            SearchIntentFit, Signals, Informational,
            None, false, false, High, MonitorSignals, Pages
        ),
        definition!(
            t::WEAK_BRAND_NAVIGATION,
            "Weak brand navigational strength",
            "Shoppers searching for the brand by name do not reliably land on the store.",
            OffsiteSignals, Signals, Informational,
            None, false, false, High, MonitorSignals, Pages
        ),
        definition!(
            t::ANSWER_MISSING_DIRECT_ANSWER,
            "Answers without a direct answer",
            "An answer that never states the answer cannot be quoted by answer engines.",
            SearchIntentFit, AnswerReadiness, Automation,
            Some(FixType::AiDraft), true, true, Low, AddAnswers, Products
        ),
        definition!(
            t::ANSWER_TOO_VAGUE,
            "Answers that are too vague",
            "Generic copy does not help a buyer decide and is ignored by answer engines.",
            SearchIntentFit, AnswerReadiness, Automation,
            Some(FixType::AiDraft), true, true, Low, AddAnswers, Products
        ),
        definition!(
            t::ANSWER_POOR_STRUCTURE,
            "Answers with poor structure",
            "Long unbroken answers are hard to scan and hard to extract.",
            SearchIntentFit, AnswerReadiness, Automation,
            Some(FixType::AiDraft), true, true, Low, AddAnswers, Products
        ),
        definition!(
            t::ANSWER_OVERLY_PROMOTIONAL,
            "Overly promotional answers",
            "Sales language in answers reads as advertising rather than information.",
            SearchIntentFit, AnswerReadiness, Automation,
            Some(FixType::AiDraft), true, true, Low, AddAnswers, Products
        ),
        definition!(
            t::ANSWER_MISSING_EXAMPLES,
            "Answers missing concrete examples",
            "Usage and fit questions are answered best with a concrete example.",
            SearchIntentFit, AnswerReadiness, Automation,
            Some(FixType::AiDraft), true, true, Low, AddAnswers, Products
        ),
    ]
});

static DEFINITIONS_BY_TYPE: Lazy<HashMap<&'static str, &'static IssueDefinition>> =
    Lazy::new(|| ISSUE_DEFINITIONS.iter().map(|d| (d.issue_type, d)).collect());

/// Look up static metadata for an issue type
pub fn definition(issue_type: &str) -> Option<&'static IssueDefinition> {
    DEFINITIONS_BY_TYPE.get(issue_type).copied()
}

/// All registered definitions, in registry order
pub fn definitions() -> &'static [IssueDefinition] {
    &ISSUE_DEFINITIONS
}

/// Fixed issue-type → action-key mapping
pub fn action_key_for(issue_type: &str) -> Option<ActionKey> {
    definition(issue_type).map(|d| d.action_key)
}

pub fn is_in_product_fixable(issue_type: &str) -> bool {
    IN_PRODUCT_FIXABLE_TYPES.contains(&issue_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_issue_type_is_registered_once() {
        let mut seen = HashSet::new();
        for def in definitions() {
            assert!(seen.insert(def.issue_type), "duplicate definition: {}", def.issue_type);
        }
        assert_eq!(seen.len(), 26);
    }

    #[test]
    fn fixable_types_are_registered() {
        for issue_type in IN_PRODUCT_FIXABLE_TYPES {
            assert!(definition(issue_type).is_some(), "{issue_type} missing from registry");
        }
    }

    #[test]
    fn informational_types_have_no_fix_type() {
        for def in definitions().iter().filter(|d| d.actionability == Actionability::Informational) {
            assert!(def.fix_type.is_none());
            assert!(!def.fix_ready);
        }
    }

    #[test]
    fn wire_ids_round_trip_through_from_str() {
        for pillar in PillarId::ALL {
            assert_eq!(pillar.as_str().parse::<PillarId>().unwrap(), pillar);
        }
        for key in ActionKey::ALL {
            assert_eq!(key.as_str().parse::<ActionKey>().unwrap(), key);
        }
        assert_eq!(
            "nope".parse::<ActionKey>().unwrap_err(),
            FilterParseError::unknown("action key", "nope")
        );
    }
}
