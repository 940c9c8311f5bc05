use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid ticket pattern: {0}")]
    Extraction(String),
    #[error("version control error: {0}")]
    VersionControl(String),
    #[error("failed to aggregate tickets: {0}")]
    Aggregation(String),
    #[error("failed to render changelog: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Failure of a single ticket fetch.
///
/// One fetch outcome is observed by every commit that references the ticket,
/// so this type is `Clone` and never escapes commit correlation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("ticket {key} not found")]
    NotFound { key: String },
    #[error("issue tracker error: {0}")]
    Transport(String),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("issue tracker is not configured")]
    NotConfigured,
}
