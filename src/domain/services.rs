//! Domain services
//!
//! Detection pipeline, evidence tracking, decoration and aggregation.

pub mod actionability;
pub mod answer_quality;
pub mod answerability;
pub mod asset_scope;
pub mod canonical_counts;
pub mod detection;
pub mod evidence;
pub mod issue_builders;
pub mod signal_builders;

pub use actionability::decorate;
pub use answer_quality::AnswerQualityError;
pub use asset_scope::{scope_to_asset, AssetIssuesView};
pub use canonical_counts::{summarize, CanonicalIssueCountsSummary, CountsError, IssueCountFilters};
pub use detection::detect_issues;
pub use evidence::{EvidenceMap, IssueSet};
