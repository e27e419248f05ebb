//! Error types for the Gemini client.

use thiserror::Error;

/// Result type for Gemini client operations.
pub type Result<T> = std::result::Result<T, GeminiError>;

/// Gemini client errors.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, quota, invalid request)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The prompt or every candidate was blocked by a safety filter
    #[error("Response blocked: {0}")]
    Blocked(String),
}

impl GeminiError {
    /// Whether a later identical request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GeminiError::Network(_) => true,
            GeminiError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
