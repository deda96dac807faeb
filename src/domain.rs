//! Domain module - issue model, detectors and counting rules
//!
//! Everything here is synchronous and pure. Collaborators are described by
//! the traits in [`repositories`] and driven from the application layer.

pub mod asset;
pub mod catalog;
pub mod issue;
pub mod repositories;
pub mod services;
pub mod severity;
pub mod snapshot;

pub use asset::{classify_url, AssetType};
pub use catalog::{ActionKey, Actionability, FilterParseError, FixCost, FixType, IssueCategory, PillarId};
pub use issue::{AssetTypeCounts, CanonicalCountTriplet, Issue, TripletPair, ISSUE_PREVIEW_LIMIT};
pub use severity::IssueSeverity;
pub use snapshot::{AnswerBlock, PageRecord, ProductRecord, SignalSet, SiteSnapshot, TechnicalFlag};
