//! Error types for the analytics core.
//!
//! Load-time failures (unreachable source, missing required column) halt the
//! current load and carry enough context to be shown once. Per-row coercion
//! failures and empty filter results are not errors; see `data::coerce` and
//! `data::filter`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("spreadsheet source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("required column '{0}' not found in sheet header")]
    MissingColumn(&'static str),

    #[error("summary service failed: {0}")]
    SummaryFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;
