//! Per-cycle counters.

use serde::{Deserialize, Serialize};

/// Counters for one sync cycle.
///
/// Write-only during the cycle, read once for the summary log, then
/// discarded. These are best-effort operational metrics, not invariants: a
/// record counted as updated may still be skipped by the store's
/// authoritative comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStats {
    /// Records returned by the listing, across all pages.
    pub fetched: u64,
    /// Records absent from the snapshot at classification time.
    pub new: u64,
    /// Records whose cheap change signal (title, price, volume) fired.
    pub updated: u64,
    /// Distinct contract ids observed this cycle.
    pub active: u64,
    /// Pages walked.
    pub pages: u32,
    /// Rows tombstoned because their id was not observed.
    pub deleted: u64,
}
