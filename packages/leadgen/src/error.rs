//! Typed errors for the lead accumulator.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

use crate::types::profile::LimitKind;

/// Errors surfaced at the run boundary.
#[derive(Debug, Error)]
pub enum RunError {
    /// The quota gate refused to start the run
    #[error("quota exceeded: {limit}")]
    QuotaExceeded { limit: LimitKind },

    /// A record source call failed; the run stopped at this batch
    #[error("extraction failed on batch {number}: {cause}", number = .batch + 1)]
    ExtractionFailed {
        batch: usize,
        #[source]
        cause: SourceError,
    },

    /// Post-run usage bookkeeping failed (the leads are still valid)
    #[error("usage recording failed: {0}")]
    UsageRecordingFailed(#[source] StoreError),

    /// Query was empty after trimming
    #[error("query must not be empty")]
    EmptyQuery,

    /// Another run is already in flight on this accumulator
    #[error("a run is already in progress")]
    RunInProgress,

    /// The caller could not load the user's profile
    #[error("profile unavailable: {0}")]
    Profile(#[source] StoreError),
}

impl RunError {
    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            RunError::QuotaExceeded {
                limit: LimitKind::DailyRuns,
            } => "Daily search limit reached for your plan. Upgrade for more!".to_string(),
            RunError::QuotaExceeded {
                limit: LimitKind::LifetimeLeads,
            } => "Lifetime lead limit reached for your plan. Upgrade for more!".to_string(),
            RunError::ExtractionFailed { .. } => {
                "Extraction failed. Please try again or check your input.".to_string()
            }
            RunError::UsageRecordingFailed(_) => {
                "Leads were found, but your usage could not be saved.".to_string()
            }
            RunError::EmptyQuery => "Enter a URL or search query to start.".to_string(),
            RunError::RunInProgress => "An extraction is already running.".to_string(),
            RunError::Profile(_) => "Your profile could not be loaded.".to_string(),
        }
    }
}

/// Errors returned by a record source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Upstream model call failed
    #[error("model error: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Upstream reported a condition worth retrying later (rate limit, 5xx)
    #[error("transient model error: {0}")]
    Transient(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Anything else the source wants to report
    #[error("{0}")]
    Other(String),
}

/// Errors from the profile store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend failure (connection, query, serialization)
    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No profile exists for this user
    #[error("profile not found: {email}")]
    ProfileNotFound { email: String },
}

/// Errors from CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for run operations.
pub type Result<T> = std::result::Result<T, RunError>;

/// Result type alias for record source calls.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;
