//! Long-running per-region sync worker.
//!
//! Runs one cycle, sleeps a fixed interval, repeats. A cycle failure is
//! logged with region context and contained; the worker keeps running until
//! shutdown is requested.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::{error, info};

use evescan_core::RegionId;

use crate::config::SyncConfig;
use crate::cycle::SyncCycle;
use crate::traits::{ContractSource, SnapshotStore};

/// Cooperative shutdown switch shared by every worker.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownSignal {
    /// Create a signal in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown and wake every sleeping worker.
    pub fn request(&self) {
        self.flag.store(true, Ordering::Relaxed);
        self.notify.notify_waiters();
    }

    /// Check whether shutdown has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Wait until shutdown is requested.
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_requested() {
            return;
        }
        notified.await;
    }
}

/// Per-region sync worker.
///
/// Workers for different regions are independent: they share only the source
/// client (stateless) and the store pool, which supports region-scoped writes
/// without cross-region locking.
pub struct SyncWorker<S, P> {
    source: Arc<S>,
    store: Arc<P>,
    config: SyncConfig,
    shutdown: ShutdownSignal,
}

impl<S, P> SyncWorker<S, P>
where
    S: ContractSource,
    P: SnapshotStore,
{
    /// Create a worker.
    pub fn new(source: Arc<S>, store: Arc<P>, config: SyncConfig, shutdown: ShutdownSignal) -> Self {
        Self {
            source,
            store,
            config,
            shutdown,
        }
    }

    /// Run cycles for one region until shutdown.
    ///
    /// The inter-cycle sleep is the worker's only suspension point and is not
    /// adaptive: a slow cycle simply delays the next one further.
    pub async fn run(&self, region_name: &str, region: RegionId) {
        info!(
            region = region_name,
            region_id = %region,
            interval_secs = self.config.sync_interval_secs,
            "starting region sync worker"
        );

        loop {
            if self.shutdown.is_requested() {
                break;
            }

            let cycle = SyncCycle::new(
                self.source.as_ref(),
                self.store.as_ref(),
                &self.config,
                region_name,
                region,
            );
            if let Err(e) = cycle.run().await {
                // Snapshot and seen-set are cycle-scoped, so a failed cycle
                // retries fully at the next interval.
                error!(region = region_name, error = %e, "sync cycle failed");
            }

            tokio::select! {
                () = tokio::time::sleep(self.config.interval()) => {}
                () = self.shutdown.wait() => break,
            }
        }

        info!(region = region_name, "region sync worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_signal_wakes_waiters() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_requested());

        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };

        signal.request();
        waiter.await.unwrap();
        assert!(signal.is_requested());
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_after_request() {
        let signal = ShutdownSignal::new();
        signal.request();
        // Must not hang even though the request predates the wait.
        signal.wait().await;
    }
}
