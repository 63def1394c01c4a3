//! Sync engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the sync cycle and worker loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fixed sleep between cycle starts, in seconds (default: 300).
    ///
    /// Not adaptive: a slow cycle simply delays the next one further.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// How many reconciled records to accumulate before flushing
    /// (default: 50).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_sync_interval_secs() -> u64 {
    300
}

fn default_batch_size() -> usize {
    50
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sync_interval_secs: default_sync_interval_secs(),
            batch_size: default_batch_size(),
        }
    }
}

impl SyncConfig {
    /// Set the inter-cycle interval in seconds.
    #[must_use]
    pub fn with_sync_interval_secs(mut self, secs: u64) -> Self {
        self.sync_interval_secs = secs;
        self
    }

    /// Set the batch flush threshold.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// The inter-cycle sleep as a [`Duration`].
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.sync_interval_secs, 300);
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.interval(), Duration::from_secs(300));
    }
}
