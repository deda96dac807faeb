//! Read snapshot consumed by the detectors
//!
//! Pages come from the crawler, products from catalog sync and signals from
//! the offline signal collector. A snapshot is fetched once per request and
//! never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Technical findings attached to a crawled page by the crawler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicalFlag {
    RenderBlockingResources,
    ExcessivePageWeight,
    MobileRenderingRisk,
    SlowInitialResponse,
    Noindex,
    MissingCanonical,
}

/// Crawled page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub h1: Option<String>,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default = "default_status_code")]
    pub status_code: u16,
    #[serde(default)]
    pub load_time_ms: Option<u64>,
    #[serde(default)]
    pub technical_flags: BTreeSet<TechnicalFlag>,
}

fn default_status_code() -> u16 {
    200
}

impl PageRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            meta_description: None,
            h1: None,
            word_count: 0,
            status_code: 200,
            load_time_ms: None,
            technical_flags: BTreeSet::new(),
        }
    }

    /// 2xx responses carry meaningful on-page content
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn has_flag(&self, flag: TechnicalFlag) -> bool {
        self.technical_flags.contains(&flag)
    }
}

/// Structured answer unit authored for a product (question id + answer copy)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerBlock {
    pub question_id: String,
    pub answer_text: String,
}

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub compare_at_price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub site_id: String,
    #[serde(default)]
    pub answer_blocks: Vec<AnswerBlock>,
}

impl ProductRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            seo_title: None,
            seo_description: None,
            image_urls: None,
            price: None,
            compare_at_price: None,
            category: None,
            site_id: String::new(),
            answer_blocks: Vec::new(),
        }
    }

    /// SEO description when present, otherwise the body description
    pub fn best_description(&self) -> Option<&str> {
        non_blank(self.seo_description.as_deref()).or_else(|| non_blank(self.description.as_deref()))
    }

    /// SEO title when present, otherwise the product title
    pub fn effective_title(&self) -> Option<&str> {
        non_blank(self.seo_title.as_deref()).or_else(|| non_blank(Some(self.title.as_str())))
    }

    pub fn has_images(&self) -> bool {
        self.image_urls
            .as_ref()
            .is_some_and(|urls| urls.iter().any(|u| !u.trim().is_empty()))
    }
}

/// Precomputed store-level health ratios in [0,1]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSet {
    #[serde(default)]
    pub entity_coverage: Option<f64>,
    #[serde(default)]
    pub indexability: Option<f64>,
    #[serde(default)]
    pub crawl_health: Option<f64>,
    #[serde(default)]
    pub answer_surface_presence: Option<f64>,
    #[serde(default)]
    pub brand_navigational_strength: Option<f64>,
}

/// Everything the detectors look at for one site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSnapshot {
    pub site_id: String,
    pub pages: Vec<PageRecord>,
    pub products: Vec<ProductRecord>,
    pub signals: SignalSet,
}

impl SiteSnapshot {
    pub fn new(
        site_id: impl Into<String>,
        pages: Vec<PageRecord>,
        products: Vec<ProductRecord>,
        signals: SignalSet,
    ) -> Self {
        Self {
            site_id: site_id.into(),
            pages,
            products,
            signals,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.products.is_empty()
    }
}

/// Trimmed value, `None` when absent or whitespace only
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn is_blank(value: Option<&str>) -> bool {
    non_blank(value).is_none()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
