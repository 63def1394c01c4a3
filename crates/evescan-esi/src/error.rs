//! Fetch error types.
//!
//! Error definitions with transient/terminal classification, so callers can
//! pattern-match on the failure mode instead of inspecting status codes.

use thiserror::Error;

/// Error that can occur while fetching from the remote API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A retryable condition (rate limit, transient 5xx, exhausted error
    /// budget) persisted through every allowed attempt.
    #[error("transient failure after {attempts} attempts (last status {status})")]
    Transient { status: u16, attempts: u32 },

    /// The server answered with a status that retrying cannot fix.
    #[error("terminal response status {status}")]
    Terminal { status: u16 },

    /// A connection-level failure (DNS, TLS, timeout, decode).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The client configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl FetchError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        FetchError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this error was caused by a temporary condition.
    ///
    /// Transient and transport failures may resolve on a later cycle;
    /// terminal statuses and configuration errors will not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Transient { .. } | FetchError::Transport(_)
        )
    }

    /// The HTTP status associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transient { status, .. } | FetchError::Terminal { status } => Some(*status),
            FetchError::Transport(e) => e.status().map(|s| s.as_u16()),
            FetchError::InvalidConfig { .. } => None,
        }
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
