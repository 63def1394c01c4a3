//! One full sync pass over a region.

use std::collections::HashSet;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use evescan_core::{ContractId, RegionId};
use evescan_store::ContractRecord;

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::reconcile::{reconcile, Classification, Outcome};
use crate::stats::CycleStats;
use crate::traits::{ContractSource, SnapshotStore};
use crate::walker::PageWalker;
use crate::writer::BatchWriter;

/// One walk–reconcile–flush–delete pass over a single region.
///
/// Reconciliation is interleaved with the page walk, so at no point does the
/// cycle hold more than one page of raw records plus the current batch.
/// Everything is cycle-scoped and rebuilt from scratch on the next run, which
/// is what makes a failed cycle safe to simply retry at the next interval.
pub struct SyncCycle<'a, S: ContractSource + ?Sized, P: SnapshotStore + ?Sized> {
    source: &'a S,
    store: &'a P,
    config: &'a SyncConfig,
    region_name: &'a str,
    region: RegionId,
}

impl<'a, S: ContractSource + ?Sized, P: SnapshotStore + ?Sized> SyncCycle<'a, S, P> {
    /// Create a cycle for one region.
    pub fn new(
        source: &'a S,
        store: &'a P,
        config: &'a SyncConfig,
        region_name: &'a str,
        region: RegionId,
    ) -> Self {
        Self {
            source,
            store,
            config,
            region_name,
            region,
        }
    }

    /// Run the cycle to completion.
    ///
    /// Aborts on the first unrecoverable fetch, normalization, or store
    /// failure; the caller owns containment and retry scheduling.
    pub async fn run(&self) -> SyncResult<CycleStats> {
        let cycle_started = Instant::now();
        let observed_at = Utc::now();

        info!(region = self.region_name, "starting contract sync");

        let mut snapshot = self.store.load_snapshot(self.region).await?;
        let mut seen: HashSet<ContractId> = HashSet::new();
        let mut stats = CycleStats::default();
        let mut writer = BatchWriter::new(self.store, self.region, self.config.batch_size);

        let mut walker = PageWalker::new(self.source, self.region);
        while let Some(page) = walker.next_page().await {
            let page = page?;
            stats.pages += 1;
            stats.fetched += page.records.len() as u64;

            for raw in &page.records {
                match reconcile(raw, &snapshot, self.region, observed_at)? {
                    Outcome::Skip { contract_id } => {
                        seen.insert(contract_id);
                    }
                    Outcome::Emit {
                        record,
                        classification,
                        needs_items,
                    } => {
                        seen.insert(record.contract_id);
                        match classification {
                            Classification::New => stats.new += 1,
                            Classification::Changed => stats.updated += 1,
                            Classification::Unchanged => {}
                        }

                        let record = if needs_items {
                            self.attach_items(record).await
                        } else {
                            record
                        };

                        if writer.push(record).await? {
                            // Later pages must classify against post-flush
                            // state, or a change persisted mid-cycle would be
                            // re-detected on every remaining page.
                            snapshot = self.store.load_snapshot(self.region).await?;
                        }
                    }
                }
            }
        }

        writer.flush().await?;

        let delete_started = Instant::now();
        stats.deleted = self.store.delete_missing(self.region, &seen).await?;
        info!(
            region = self.region_name,
            deleted = stats.deleted,
            elapsed_ms = delete_started.elapsed().as_millis() as u64,
            "removed vanished contracts"
        );

        stats.active = seen.len() as u64;
        info!(
            region = self.region_name,
            fetched = stats.fetched,
            new = stats.new,
            updated = stats.updated,
            active = stats.active,
            deleted = stats.deleted,
            pages = stats.pages,
            elapsed_ms = cycle_started.elapsed().as_millis() as u64,
            "sync cycle complete"
        );

        Ok(stats)
    }

    /// Fetch and attach the item list, preferring availability of the basic
    /// record over completeness: a failed item fetch is logged and the record
    /// is emitted without an item list, to be backfilled on a later cycle.
    async fn attach_items(&self, record: ContractRecord) -> ContractRecord {
        match self.source.fetch_items(record.contract_id).await {
            Ok(items) => record.with_items(items),
            Err(e) => {
                warn!(
                    region = self.region_name,
                    contract_id = %record.contract_id,
                    error = %e,
                    "item fetch failed, emitting record without items"
                );
                record
            }
        }
    }
}
