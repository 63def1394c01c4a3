//! Test doubles for driving sync cycles without network or Postgres.
//!
//! `ScriptedSource` serves a fixed page script; `MemoryStore` mirrors the
//! real repository's semantics: content-only change detection, item-list
//! coalescing, and region-scoped set-difference deletion.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use evescan_core::{ContractId, RegionId};
use evescan_esi::{ContractPage, FetchError, FetchResult};
use evescan_store::{ContractRecord, Snapshot, SnapshotEntry, StoreResult};
use evescan_sync::{ContractSource, SnapshotStore};

/// A contract source that replays a fixed script of pages and item lists.
#[derive(Default)]
pub struct ScriptedSource {
    pages: Vec<Vec<Value>>,
    /// Per-page override of the reported total page count.
    totals: Option<Vec<u32>>,
    items: HashMap<i64, Vec<Value>>,
    failing_items: HashSet<i64>,
    fail_at_page: Option<u32>,
    /// Pages requested, in order.
    pub page_calls: Mutex<Vec<u32>>,
    /// Contracts whose items were requested, in order.
    pub item_calls: Mutex<Vec<i64>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, records: Vec<Value>) -> Self {
        self.pages.push(records);
        self
    }

    pub fn with_totals(mut self, totals: Vec<u32>) -> Self {
        self.totals = Some(totals);
        self
    }

    pub fn with_items(mut self, contract_id: i64, items: Vec<Value>) -> Self {
        self.items.insert(contract_id, items);
        self
    }

    pub fn with_failing_items(mut self, contract_id: i64) -> Self {
        self.failing_items.insert(contract_id);
        self
    }

    pub fn with_failure_at_page(mut self, page: u32) -> Self {
        self.fail_at_page = Some(page);
        self
    }
}

#[async_trait]
impl ContractSource for ScriptedSource {
    async fn fetch_page(&self, _region: RegionId, page: u32) -> FetchResult<ContractPage> {
        self.page_calls.lock().unwrap().push(page);

        if self.fail_at_page == Some(page) {
            return Err(FetchError::Terminal { status: 403 });
        }

        let index = (page - 1) as usize;
        let records = self.pages.get(index).cloned().unwrap_or_default();
        let total_pages = self
            .totals
            .as_ref()
            .and_then(|totals| totals.get(index).copied())
            .unwrap_or(self.pages.len().max(1) as u32);

        Ok(ContractPage {
            records,
            total_pages,
        })
    }

    async fn fetch_items(&self, contract: ContractId) -> FetchResult<Vec<Value>> {
        self.item_calls.lock().unwrap().push(contract.value());

        if self.failing_items.contains(&contract.value()) {
            return Err(FetchError::Terminal { status: 500 });
        }

        Ok(self
            .items
            .get(&contract.value())
            .cloned()
            .unwrap_or_default())
    }
}

/// An in-memory snapshot store with the repository's write semantics.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<(i64, i64), ContractRecord>>,
    /// Record counts of each non-empty upsert call.
    pub upsert_batches: Mutex<Vec<usize>>,
    /// How many times the snapshot was loaded.
    pub snapshot_loads: Mutex<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored row directly, bypassing change detection.
    pub fn seed(&self, record: ContractRecord) {
        self.rows.lock().unwrap().insert(
            (record.region_id.value(), record.contract_id.value()),
            record,
        );
    }

    /// Stored contract ids for one region.
    pub fn stored_ids(&self, region: RegionId) -> HashSet<i64> {
        self.rows
            .lock()
            .unwrap()
            .keys()
            .filter(|(r, _)| *r == region.value())
            .map(|(_, id)| *id)
            .collect()
    }

    /// A stored row, cloned.
    pub fn row(&self, region: RegionId, contract_id: i64) -> Option<ContractRecord> {
        self.rows
            .lock()
            .unwrap()
            .get(&(region.value(), contract_id))
            .cloned()
    }
}

/// Field-by-field comparison over the content columns, mirroring the SQL
/// `IS DISTINCT FROM` row check (bookkeeping timestamps excluded).
fn content_differs(
    stored: &ContractRecord,
    incoming: &ContractRecord,
    effective_items: Option<&Value>,
) -> bool {
    stored.contract_type != incoming.contract_type
        || stored.title != incoming.title
        || stored.region_id != incoming.region_id
        || stored.collateral != incoming.collateral
        || stored.reward != incoming.reward
        || stored.buyout != incoming.buyout
        || stored.price != incoming.price
        || stored.volume != incoming.volume
        || stored.issuer_id != incoming.issuer_id
        || stored.issuer_corporation_id != incoming.issuer_corporation_id
        || stored.date_issued != incoming.date_issued
        || stored.date_expired != incoming.date_expired
        || stored.days_to_complete != incoming.days_to_complete
        || stored.start_location_id != incoming.start_location_id
        || stored.end_location_id != incoming.end_location_id
        || stored.items.as_ref() != effective_items
        || stored.raw != incoming.raw
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load_snapshot(&self, region: RegionId) -> StoreResult<Snapshot> {
        *self.snapshot_loads.lock().unwrap() += 1;

        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|record| record.region_id == region)
            .map(|record| {
                (
                    record.contract_id,
                    SnapshotEntry {
                        title: record.title.clone(),
                        price: record.price,
                        volume: record.volume,
                        has_items: record.items.is_some(),
                    },
                )
            })
            .collect())
    }

    async fn upsert(&self, region: RegionId, records: &[ContractRecord]) -> StoreResult<u64> {
        self.upsert_batches.lock().unwrap().push(records.len());

        let mut rows = self.rows.lock().unwrap();
        let mut written = 0u64;
        for record in records {
            let key = (region.value(), record.contract_id.value());
            match rows.get(&key) {
                None => {
                    rows.insert(key, record.clone());
                    written += 1;
                }
                Some(stored) => {
                    let effective_items = record.items.clone().or_else(|| stored.items.clone());
                    if content_differs(stored, record, effective_items.as_ref()) {
                        let mut updated = record.clone();
                        updated.items = effective_items;
                        rows.insert(key, updated);
                        written += 1;
                    }
                }
            }
        }
        Ok(written)
    }

    async fn delete_missing(
        &self,
        region: RegionId,
        seen: &HashSet<ContractId>,
    ) -> StoreResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(r, id), _| *r != region.value() || seen.contains(&ContractId::new(*id)));
        Ok((before - rows.len()) as u64)
    }
}
