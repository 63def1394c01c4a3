//! Sync engine error types.

use thiserror::Error;

use evescan_esi::FetchError;
use evescan_store::StoreError;

use crate::reconcile::NormalizeError;

/// Error that aborts the current sync cycle.
///
/// Every variant is caught at the worker boundary, logged with region
/// context, and retried on the next scheduled interval; none of them ever
/// terminates the process.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The page walk hit an unrecoverable fetch failure.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// A snapshot load, batch flush, or deletion failed.
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    /// A remote record could not be normalized.
    #[error("malformed record: {0}")]
    Normalize(#[from] NormalizeError),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
