//! Asset classification and composite asset keys
//!
//! Every affected asset is identified by a composite key of the form
//! `"<assetType>:<id-or-url>"`. Product keys use the catalog id, page and
//! collection keys use the crawled URL.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::domain::catalog::FilterParseError;

/// Member placeholder for issues that apply to the whole store.
pub const STORE_WIDE_MEMBER: &str = "__store_wide__";

/// Asset buckets used for scoping and per-type counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Products,
    Pages,
    Collections,
}

impl AssetType {
    pub const ALL: [AssetType; 3] = [AssetType::Products, AssetType::Pages, AssetType::Collections];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Products => "products",
            AssetType::Pages => "pages",
            AssetType::Collections => "collections",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "products" => Ok(AssetType::Products),
            "pages" => Ok(AssetType::Pages),
            "collections" => Ok(AssetType::Collections),
            other => Err(FilterParseError::unknown("asset type", other)),
        }
    }
}

/// Classify a crawled URL into an asset bucket.
///
/// Absolute URLs are parsed and only their path is inspected; anything that
/// does not parse is treated as a path. Unknown shapes fall back to pages,
/// so this never fails.
pub fn classify_url(raw: &str) -> AssetType {
    let trimmed = raw.trim();
    let path = match Url::parse(trimmed) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => trimmed.to_string(),
    };

    if path.starts_with("/collections") {
        AssetType::Collections
    } else if path.starts_with("/products") {
        AssetType::Products
    } else {
        AssetType::Pages
    }
}

/// Build a composite key for an asset
pub fn asset_key(asset_type: AssetType, member: &str) -> String {
    format!("{}:{}", asset_type.as_str(), member)
}

/// Composite key for a catalog product id
pub fn product_key(product_id: &str) -> String {
    asset_key(AssetType::Products, product_id)
}

/// Composite key for a crawled URL, bucketed by [`classify_url`]
pub fn url_key(url: &str) -> String {
    asset_key(classify_url(url), url)
}

/// Synthetic key standing in for a store-wide issue
pub fn store_wide_key(asset_type: AssetType) -> String {
    asset_key(asset_type, STORE_WIDE_MEMBER)
}
