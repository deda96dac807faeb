//! Ratio detectors ("higher is worse")
//!
//! Each detector counts affected assets over a denominator, classifies the
//! ratio against its own thresholds and emits at most one issue. A zero
//! denominator or a ratio at or below the info threshold emits nothing.

use std::collections::{BTreeMap, HashSet};

use crate::domain::asset::classify_url;
use crate::domain::catalog::{definition, issue_types};
use crate::domain::issue::{AssetTypeCounts, Issue};
use crate::domain::services::answerability::{self, AnswerabilityStatus};
use crate::domain::services::evidence::{AffectedAssets, DetectedIssue};
use crate::domain::severity::{affected_ratio, RatioThresholds};
use crate::domain::snapshot::{
    is_blank, non_blank, word_count, PageRecord, ProductRecord, SiteSnapshot, TechnicalFlag,
};

pub const MIN_TITLE_CHARS: usize = 30;
pub const MAX_TITLE_CHARS: usize = 65;
pub const THIN_PAGE_WORDS: u32 = 150;
pub const THIN_PRODUCT_WORDS: usize = 50;
pub const SLOW_RESPONSE_MS: u64 = 3000;
/// Normalized descriptions shorter than this are never treated as duplicates
pub const DUPLICATE_MIN_CHARS: usize = 20;

const MISSING_SEO_TITLE: RatioThresholds = RatioThresholds::new(0.30, 0.10, 0.0);
const MISSING_SEO_DESCRIPTION: RatioThresholds = RatioThresholds::new(0.30, 0.10, 0.0);
const WEAK_TITLES: RatioThresholds = RatioThresholds::new(0.40, 0.20, 0.05);
const MISSING_PAGE_METADATA: RatioThresholds = RatioThresholds::new(0.30, 0.10, 0.0);
const MISSING_H1: RatioThresholds = RatioThresholds::new(0.40, 0.20, 0.05);
const THIN_CONTENT: RatioThresholds = RatioThresholds::new(0.50, 0.25, 0.10);
const DUPLICATE_PRODUCT_CONTENT: RatioThresholds = RatioThresholds::new(0.30, 0.10, 0.0);
const MISSING_PRODUCT_IMAGES: RatioThresholds = RatioThresholds::new(0.20, 0.05, 0.0);
const MISSING_PRICE: RatioThresholds = RatioThresholds::new(0.10, 0.0, 0.0);
const MISSING_CATEGORY: RatioThresholds = RatioThresholds::new(0.40, 0.20, 0.0);
const RENDER_BLOCKING_RESOURCES: RatioThresholds = RatioThresholds::new(0.40, 0.20, 0.05);
const SLOW_RESPONSE: RatioThresholds = RatioThresholds::new(0.30, 0.15, 0.05);
const EXCESSIVE_PAGE_WEIGHT: RatioThresholds = RatioThresholds::new(0.30, 0.15, 0.05);
const MOBILE_RENDERING_RISK: RatioThresholds = RatioThresholds::new(0.30, 0.10, 0.0);
const HTTP_ERRORS: RatioThresholds = RatioThresholds::new(0.10, 0.05, 0.0);
const MISSING_ANSWER_CONTENT: RatioThresholds = RatioThresholds::new(0.50, 0.25, 0.0);

/// Shared ratio rule: classify, look up metadata, attach exact per-type counts.
pub(crate) fn ratio_issue(
    issue_type: &str,
    thresholds: RatioThresholds,
    affected: AffectedAssets,
    total: usize,
    describe: impl FnOnce(usize, usize) -> String,
) -> Option<DetectedIssue> {
    let count = affected.product_ids.len() + affected.urls.len();
    let severity = thresholds.classify(affected_ratio(count, total)?)?;
    let def = definition(issue_type)?;

    let mut counts = AssetTypeCounts::new(affected.product_ids.len(), 0, 0);
    for url in &affected.urls {
        counts.increment(classify_url(url));
    }

    let issue = Issue::from_definition(def, severity, count, describe(count, total))
        .with_asset_type_counts(counts);
    Some(DetectedIssue::new(issue, affected))
}

fn product_ids<'a>(products: impl Iterator<Item = &'a ProductRecord>) -> Vec<String> {
    products.map(|p| p.id.clone()).collect()
}

fn page_urls<'a>(pages: impl Iterator<Item = &'a PageRecord>) -> Vec<String> {
    pages.map(|p| p.url.clone()).collect()
}

fn successful_pages(snapshot: &SiteSnapshot) -> impl Iterator<Item = &PageRecord> {
    snapshot.pages.iter().filter(|p| p.is_successful())
}

fn title_out_of_range(title: &str) -> bool {
    let len = title.chars().count();
    !(MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&len)
}

pub fn missing_seo_title(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let affected = product_ids(snapshot.products.iter().filter(|p| is_blank(p.seo_title.as_deref())));
    ratio_issue(
        issue_types::MISSING_SEO_TITLE,
        MISSING_SEO_TITLE,
        AffectedAssets::products(affected),
        snapshot.products.len(),
        |n, total| format!("{n} of {total} products have no SEO title."),
    )
}

pub fn missing_seo_description(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let affected = product_ids(
        snapshot
            .products
            .iter()
            .filter(|p| is_blank(p.seo_description.as_deref())),
    );
    ratio_issue(
        issue_types::MISSING_SEO_DESCRIPTION,
        MISSING_SEO_DESCRIPTION,
        AffectedAssets::products(affected),
        snapshot.products.len(),
        |n, total| format!("{n} of {total} products have no SEO description."),
    )
}

pub fn weak_titles(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let products: Vec<(&ProductRecord, &str)> = snapshot
        .products
        .iter()
        .filter_map(|p| p.effective_title().map(|t| (p, t)))
        .collect();
    let pages: Vec<(&PageRecord, &str)> = successful_pages(snapshot)
        .filter_map(|p| non_blank(p.title.as_deref()).map(|t| (p, t)))
        .collect();

    let total = products.len() + pages.len();
    let affected = AffectedAssets {
        product_ids: products
            .iter()
            .filter(|(_, t)| title_out_of_range(t))
            .map(|(p, _)| p.id.clone())
            .collect(),
        urls: pages
            .iter()
            .filter(|(_, t)| title_out_of_range(t))
            .map(|(p, _)| p.url.clone())
            .collect(),
    };
    ratio_issue(issue_types::WEAK_TITLES, WEAK_TITLES, affected, total, |n, total| {
        format!("{n} of {total} titles are shorter than {MIN_TITLE_CHARS} or longer than {MAX_TITLE_CHARS} characters.")
    })
}

pub fn missing_page_metadata(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let total = successful_pages(snapshot).count();
    let affected = page_urls(successful_pages(snapshot).filter(|p| {
        is_blank(p.title.as_deref()) || is_blank(p.meta_description.as_deref())
    }));
    ratio_issue(
        issue_types::MISSING_PAGE_METADATA,
        MISSING_PAGE_METADATA,
        AffectedAssets::urls(affected),
        total,
        |n, total| format!("{n} of {total} pages are missing a title or meta description."),
    )
}

pub fn missing_h1(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let total = successful_pages(snapshot).count();
    let affected = page_urls(successful_pages(snapshot).filter(|p| is_blank(p.h1.as_deref())));
    ratio_issue(
        issue_types::MISSING_H1,
        MISSING_H1,
        AffectedAssets::urls(affected),
        total,
        |n, total| format!("{n} of {total} pages have no H1 heading."),
    )
}

pub fn thin_content(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let total = successful_pages(snapshot).count() + snapshot.products.len();
    let affected = AffectedAssets {
        product_ids: product_ids(snapshot.products.iter().filter(|p| {
            p.description.as_deref().map_or(0, word_count) < THIN_PRODUCT_WORDS
        })),
        urls: page_urls(successful_pages(snapshot).filter(|p| p.word_count < THIN_PAGE_WORDS)),
    };
    ratio_issue(issue_types::THIN_CONTENT, THIN_CONTENT, affected, total, |n, total| {
        format!("{n} of {total} pages and products have too little copy to rank or convert.")
    })
}

/// Trim + lowercase; descriptions only match when identical after this
pub fn normalize_description(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Groups of two or more products sharing a normalized description.
///
/// Groups are ordered by first appearance and members keep snapshot order.
pub fn duplicate_clusters(products: &[ProductRecord]) -> Vec<Vec<&ProductRecord>> {
    let mut groups: BTreeMap<String, (usize, Vec<&ProductRecord>)> = BTreeMap::new();
    for (index, product) in products.iter().enumerate() {
        let Some(text) = product.best_description() else {
            continue;
        };
        let normalized = normalize_description(text);
        if normalized.chars().count() < DUPLICATE_MIN_CHARS {
            continue;
        }
        groups
            .entry(normalized)
            .or_insert_with(|| (index, Vec::new()))
            .1
            .push(product);
    }

    let mut clusters: Vec<(usize, Vec<&ProductRecord>)> =
        groups.into_values().filter(|(_, members)| members.len() >= 2).collect();
    clusters.sort_by_key(|(first_index, _)| *first_index);
    clusters.into_iter().map(|(_, members)| members).collect()
}

pub fn duplicate_product_content(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let clusters = duplicate_clusters(&snapshot.products);
    let cluster_count = clusters.len();
    let members: HashSet<&str> = clusters.iter().flatten().map(|p| p.id.as_str()).collect();
    // Snapshot order, not cluster order
    let affected = product_ids(snapshot.products.iter().filter(|p| members.contains(p.id.as_str())));

    ratio_issue(
        issue_types::DUPLICATE_PRODUCT_CONTENT,
        DUPLICATE_PRODUCT_CONTENT,
        AffectedAssets::products(affected),
        snapshot.products.len(),
        |n, total| format!("{n} of {total} products share a description with another product ({cluster_count} duplicate groups)."),
    )
}

pub fn missing_product_images(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let affected = product_ids(snapshot.products.iter().filter(|p| !p.has_images()));
    ratio_issue(
        issue_types::MISSING_PRODUCT_IMAGES,
        MISSING_PRODUCT_IMAGES,
        AffectedAssets::products(affected),
        snapshot.products.len(),
        |n, total| format!("{n} of {total} products have no images."),
    )
}

pub fn missing_price(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let affected = product_ids(
        snapshot
            .products
            .iter()
            .filter(|p| !p.price.is_some_and(|price| price.is_finite() && price > 0.0)),
    );
    ratio_issue(
        issue_types::MISSING_PRICE,
        MISSING_PRICE,
        AffectedAssets::products(affected),
        snapshot.products.len(),
        |n, total| format!("{n} of {total} products have no valid price."),
    )
}

pub fn missing_category(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let affected = product_ids(snapshot.products.iter().filter(|p| is_blank(p.category.as_deref())));
    ratio_issue(
        issue_types::MISSING_CATEGORY,
        MISSING_CATEGORY,
        AffectedAssets::products(affected),
        snapshot.products.len(),
        |n, total| format!("{n} of {total} products have no category or product type."),
    )
}

fn flagged_pages(
    snapshot: &SiteSnapshot,
    issue_type: &str,
    thresholds: RatioThresholds,
    matches: impl Fn(&PageRecord) -> bool,
    noun: &str,
) -> Option<DetectedIssue> {
    let affected = page_urls(snapshot.pages.iter().filter(|p| matches(p)));
    ratio_issue(
        issue_type,
        thresholds,
        AffectedAssets::urls(affected),
        snapshot.pages.len(),
        |n, total| format!("{n} of {total} crawled pages {noun}."),
    )
}

pub fn render_blocking_resources(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    flagged_pages(
        snapshot,
        issue_types::RENDER_BLOCKING_RESOURCES,
        RENDER_BLOCKING_RESOURCES,
        |p| p.has_flag(TechnicalFlag::RenderBlockingResources),
        "load render-blocking scripts or styles",
    )
}

pub fn slow_response(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    flagged_pages(
        snapshot,
        issue_types::SLOW_RESPONSE,
        SLOW_RESPONSE,
        |p| {
            p.load_time_ms.is_some_and(|ms| ms > SLOW_RESPONSE_MS)
                || p.has_flag(TechnicalFlag::SlowInitialResponse)
        },
        "respond slowly",
    )
}

pub fn excessive_page_weight(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    flagged_pages(
        snapshot,
        issue_types::EXCESSIVE_PAGE_WEIGHT,
        EXCESSIVE_PAGE_WEIGHT,
        |p| p.has_flag(TechnicalFlag::ExcessivePageWeight),
        "are heavier than recommended",
    )
}

pub fn mobile_rendering_risk(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    flagged_pages(
        snapshot,
        issue_types::MOBILE_RENDERING_RISK,
        MOBILE_RENDERING_RISK,
        |p| p.has_flag(TechnicalFlag::MobileRenderingRisk),
        "risk rendering poorly on mobile",
    )
}

pub fn http_errors(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    flagged_pages(
        snapshot,
        issue_types::HTTP_ERRORS,
        HTTP_ERRORS,
        |p| p.status_code >= 400,
        "returned an HTTP error",
    )
}

pub fn missing_answer_content(snapshot: &SiteSnapshot) -> Option<DetectedIssue> {
    let results: Vec<_> = snapshot
        .products
        .iter()
        .map(|p| (p, answerability::classify_product(p)))
        .collect();
    let project = answerability::project_status(results.iter().map(|(_, r)| r));

    let affected = product_ids(
        results
            .iter()
            .filter(|(_, r)| r.status == AnswerabilityStatus::NeedsAnswers)
            .map(|(p, _)| *p),
    );
    ratio_issue(
        issue_types::MISSING_ANSWER_CONTENT,
        MISSING_ANSWER_CONTENT,
        AffectedAssets::products(affected),
        snapshot.products.len(),
        |n, total| {
            format!(
                "{n} of {total} products answer fewer than 3 common buyer questions (catalog status: {}).",
                project.as_str()
            )
        },
    )
}
