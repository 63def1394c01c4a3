//! Batched writes to the snapshot store.

use std::time::Instant;

use tracing::info;

use evescan_core::RegionId;
use evescan_store::ContractRecord;

use crate::error::SyncResult;
use crate::traits::SnapshotStore;

/// Accumulates reconciled records and flushes them as one transaction once
/// the threshold is reached.
///
/// After every flush the caller must reload its snapshot, so classification
/// on later pages sees post-flush state; [`BatchWriter::push`] returns
/// whether a flush happened for exactly that purpose.
pub struct BatchWriter<'a, S: SnapshotStore + ?Sized> {
    store: &'a S,
    region: RegionId,
    threshold: usize,
    buffer: Vec<ContractRecord>,
}

impl<'a, S: SnapshotStore + ?Sized> BatchWriter<'a, S> {
    /// Create a writer flushing every `threshold` records.
    pub fn new(store: &'a S, region: RegionId, threshold: usize) -> Self {
        Self {
            store,
            region,
            threshold: threshold.max(1),
            buffer: Vec::new(),
        }
    }

    /// Number of records currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Buffer one record; returns `true` when this push triggered a flush.
    pub async fn push(&mut self, record: ContractRecord) -> SyncResult<bool> {
        self.buffer.push(record);
        if self.buffer.len() >= self.threshold {
            self.flush().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Flush whatever is buffered; a no-op on an empty buffer.
    ///
    /// Returns the number of rows the store really wrote.
    pub async fn flush(&mut self) -> SyncResult<u64> {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        let records = std::mem::take(&mut self.buffer);
        let started = Instant::now();
        let written = self.store.upsert(self.region, &records).await?;
        info!(
            region = %self.region,
            records = records.len(),
            written,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "flushed contract batch"
        );
        Ok(written)
    }
}
