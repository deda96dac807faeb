//! Errors surfaced by the issue engine

use thiserror::Error;

use crate::domain::catalog::FilterParseError;
use crate::domain::services::CountsError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Site not found: {site_id}")]
    SiteNotFound { site_id: String },

    #[error("Actor '{actor_id}' has no access to site '{site_id}'")]
    AccessDenied { site_id: String, actor_id: String },

    #[error("Collaborator read failed: {0}")]
    Collaborator(#[from] anyhow::Error),

    #[error(transparent)]
    InvalidFilter(#[from] FilterParseError),

    #[error(transparent)]
    Counts(#[from] CountsError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
