//! ESI client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{FetchError, FetchResult};

/// Default public ESI endpoint.
pub const DEFAULT_BASE_URL: &str = "https://esi.evetech.net/latest";

/// Configuration for the ESI client and its retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsiConfig {
    /// Base URL of the ESI API, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request network timeout in seconds (default: 10).
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum attempts for a retryable condition (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Exponent base for the backoff delay (default: 1.5).
    #[serde(default = "default_backoff_base")]
    pub backoff_base: f64,

    /// Length of one backoff time unit in milliseconds (default: 1000).
    ///
    /// The delay after the k-th failed attempt is `unit * base^(k-1)`.
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    concat!("evescan/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base() -> f64 {
    1.5
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

impl Default for EsiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_base: default_backoff_base(),
            backoff_unit_ms: default_backoff_unit_ms(),
        }
    }
}

impl EsiConfig {
    /// Create a config pointing at a custom base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the maximum attempt count.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the backoff exponent base.
    #[must_use]
    pub fn with_backoff_base(mut self, base: f64) -> Self {
        self.backoff_base = base;
        self
    }

    /// Set the backoff time unit in milliseconds.
    #[must_use]
    pub fn with_backoff_unit_ms(mut self, unit_ms: u64) -> Self {
        self.backoff_unit_ms = unit_ms;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> FetchResult<()> {
        if self.base_url.is_empty() {
            return Err(FetchError::invalid_config("base_url must not be empty"));
        }
        if self.max_attempts == 0 {
            return Err(FetchError::invalid_config("max_attempts must be at least 1"));
        }
        if self.backoff_base <= 0.0 {
            return Err(FetchError::invalid_config("backoff_base must be positive"));
        }
        Ok(())
    }

    /// Backoff delay applied after the k-th failed attempt (1-indexed).
    ///
    /// Delays grow as `unit * base^(k-1)`: the first retry waits one full
    /// unit, the second `base` units, and so on, uncapped and without jitter.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let units = self.backoff_base.powi(exponent as i32);
        Duration::from_secs_f64(units * self.backoff_unit_ms as f64 / 1000.0)
    }
}
