//! Storefront Issues - content/SEO issue detection and canonical counting
//!
//! Analyzes a merchant's crawled pages and product catalog, reports
//! actionable defects with severities and rolls them up into exact,
//! deduplicated counts for dashboards and permission-gated fix flows.
//!
//! - [`domain`]: snapshot model, detectors, evidence, decoration, aggregation
//! - [`application`]: the [`IssueEngine`] request-level operations
//! - [`infrastructure`]: configuration, logging and in-memory collaborators

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{ComputeOptions, EngineError, EngineResult, IssueEngine};
pub use domain::services::{CanonicalIssueCountsSummary, IssueCountFilters};
pub use infrastructure::EngineConfig;
