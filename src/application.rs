//! Application layer module
//!
//! Orchestrates collaborators and domain services into the engine's
//! request-level operations.

pub mod automation;
pub mod dto;
pub mod error;
pub mod issue_engine;

pub use automation::{AutomationDispatcher, AutomationItem, AutomationRun};
pub use dto::{
    AssetIssuesResponse, CanonicalCountsResponse, ComputeOptions, IssueCountsSummary, IssuesResponse,
    IssuesWithSummaryResponse,
};
pub use error::{EngineError, EngineResult};
pub use issue_engine::{Collaborators, IssueEngine};
