//! Trait seams between the engine and its collaborators.
//!
//! The engine talks to the remote API and the persisted store only through
//! these two traits, so cycles can be driven end-to-end in tests with
//! scripted sources and in-memory stores.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;

use evescan_core::{ContractId, RegionId};
use evescan_esi::{ContractPage, EsiClient, FetchResult};
use evescan_store::{ContractRecord, ContractRepository, Snapshot, StoreResult};

/// The remote collection and item resources.
#[async_trait]
pub trait ContractSource: Send + Sync {
    /// Fetch one page of the region's public contract listing.
    async fn fetch_page(&self, region: RegionId, page: u32) -> FetchResult<ContractPage>;

    /// Fetch the item list of one contract. Expensive; called selectively.
    async fn fetch_items(&self, contract: ContractId) -> FetchResult<Vec<Value>>;
}

#[async_trait]
impl ContractSource for EsiClient {
    async fn fetch_page(&self, region: RegionId, page: u32) -> FetchResult<ContractPage> {
        self.fetch_public_contracts(region, page).await
    }

    async fn fetch_items(&self, contract: ContractId) -> FetchResult<Vec<Value>> {
        self.fetch_contract_items(contract).await
    }
}

/// The persisted store collaborator.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last-persisted state for one region.
    async fn load_snapshot(&self, region: RegionId) -> StoreResult<Snapshot>;

    /// Upsert a batch of records atomically; returns rows really written.
    async fn upsert(&self, region: RegionId, records: &[ContractRecord]) -> StoreResult<u64>;

    /// Delete every stored contract in the region not in `seen`; returns the
    /// number of rows removed.
    async fn delete_missing(
        &self,
        region: RegionId,
        seen: &HashSet<ContractId>,
    ) -> StoreResult<u64>;
}

#[async_trait]
impl SnapshotStore for ContractRepository {
    async fn load_snapshot(&self, region: RegionId) -> StoreResult<Snapshot> {
        ContractRepository::load_snapshot(self, region).await
    }

    async fn upsert(&self, region: RegionId, records: &[ContractRecord]) -> StoreResult<u64> {
        self.upsert_batch(region, records).await
    }

    async fn delete_missing(
        &self,
        region: RegionId,
        seen: &HashSet<ContractId>,
    ) -> StoreResult<u64> {
        ContractRepository::delete_missing(self, region, seen).await
    }
}
