//! Contract repository.
//!
//! All store access for the sync engine: snapshot loading, the authoritative
//! change-detecting upsert, and region-scoped deletion of vanished contracts.

use std::collections::HashSet;

use sqlx::PgPool;
use tracing::debug;

use evescan_core::{ContractId, RegionId};

use crate::error::{StoreError, StoreResult};
use crate::models::contract::{ContractRecord, Snapshot, SnapshotRow};

/// Upsert statement with the field-by-field change check.
///
/// The `WHERE` clause compares the content columns only — bookkeeping columns
/// (`last_seen`, `created_at`, `updated_at`) are refreshed when a row
/// actually changes but never make a row count as changed by themselves. The
/// item list is coalesced so a record emitted without one never clobbers
/// stored items.
const UPSERT_SQL: &str = r"
INSERT INTO contracts (
    contract_id, type, title, region_id, collateral, reward, buyout, price,
    volume, issuer_id, issuer_corporation_id, date_issued, date_expired,
    days_to_complete, start_location_id, end_location_id, items, raw_contract,
    last_seen
) VALUES (
    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
    $17, $18, $19
)
ON CONFLICT (contract_id) DO UPDATE SET
    type = EXCLUDED.type,
    title = EXCLUDED.title,
    region_id = EXCLUDED.region_id,
    collateral = EXCLUDED.collateral,
    reward = EXCLUDED.reward,
    buyout = EXCLUDED.buyout,
    price = EXCLUDED.price,
    volume = EXCLUDED.volume,
    issuer_id = EXCLUDED.issuer_id,
    issuer_corporation_id = EXCLUDED.issuer_corporation_id,
    date_issued = EXCLUDED.date_issued,
    date_expired = EXCLUDED.date_expired,
    days_to_complete = EXCLUDED.days_to_complete,
    start_location_id = EXCLUDED.start_location_id,
    end_location_id = EXCLUDED.end_location_id,
    items = COALESCE(EXCLUDED.items, contracts.items),
    raw_contract = EXCLUDED.raw_contract,
    last_seen = EXCLUDED.last_seen,
    updated_at = NOW()
WHERE (
    contracts.type, contracts.title, contracts.region_id, contracts.collateral,
    contracts.reward, contracts.buyout, contracts.price, contracts.volume,
    contracts.issuer_id, contracts.issuer_corporation_id,
    contracts.date_issued, contracts.date_expired, contracts.days_to_complete,
    contracts.start_location_id, contracts.end_location_id, contracts.items,
    contracts.raw_contract
) IS DISTINCT FROM (
    EXCLUDED.type, EXCLUDED.title, EXCLUDED.region_id, EXCLUDED.collateral,
    EXCLUDED.reward, EXCLUDED.buyout, EXCLUDED.price, EXCLUDED.volume,
    EXCLUDED.issuer_id, EXCLUDED.issuer_corporation_id,
    EXCLUDED.date_issued, EXCLUDED.date_expired, EXCLUDED.days_to_complete,
    EXCLUDED.start_location_id, EXCLUDED.end_location_id,
    COALESCE(EXCLUDED.items, contracts.items), EXCLUDED.raw_contract
)
";

/// Repository over the contracts table.
///
/// Holds a clone of the shared connection pool; cheap to clone.
#[derive(Debug, Clone)]
pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    /// Create a repository over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the snapshot for one region: every stored contract id mapped to
    /// the state the reconciler diffs against.
    pub async fn load_snapshot(&self, region: RegionId) -> StoreResult<Snapshot> {
        let rows: Vec<SnapshotRow> = sqlx::query_as(
            r"
            SELECT contract_id, title, price, volume,
                   (items IS NOT NULL) AS has_items
            FROM contracts
            WHERE region_id = $1
            ",
        )
        .bind(region.value())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::QueryFailed)?;

        Ok(rows.into_iter().map(SnapshotRow::into_entry).collect())
    }

    /// Upsert a batch of records in one transaction.
    ///
    /// Inserts fresh contracts and overwrites existing ones only when at
    /// least one content field actually differs; the returned count is the
    /// number of rows really written.
    pub async fn upsert_batch(
        &self,
        region: RegionId,
        records: &[ContractRecord],
    ) -> StoreResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(StoreError::TransactionFailed)?;

        let mut written = 0u64;
        for record in records {
            let result = sqlx::query(UPSERT_SQL)
                .bind(record.contract_id.value())
                .bind(record.contract_type.as_str())
                .bind(&record.title)
                .bind(record.region_id.value())
                .bind(record.collateral)
                .bind(record.reward)
                .bind(record.buyout)
                .bind(record.price)
                .bind(record.volume)
                .bind(record.issuer_id)
                .bind(record.issuer_corporation_id)
                .bind(record.date_issued)
                .bind(record.date_expired)
                .bind(record.days_to_complete)
                .bind(record.start_location_id)
                .bind(record.end_location_id)
                .bind(record.items.as_ref())
                .bind(&record.raw)
                .bind(record.last_seen)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::QueryFailed)?;
            written += result.rows_affected();
        }

        tx.commit().await.map_err(StoreError::TransactionFailed)?;

        debug!(
            region = %region,
            records = records.len(),
            written,
            "flushed contract batch"
        );
        Ok(written)
    }

    /// Delete every stored contract in the region whose id was not observed
    /// this cycle. One statement, all-or-nothing.
    pub async fn delete_missing(
        &self,
        region: RegionId,
        seen: &HashSet<ContractId>,
    ) -> StoreResult<u64> {
        let seen_ids: Vec<i64> = seen.iter().map(|id| id.value()).collect();

        let result = sqlx::query(
            r"
            DELETE FROM contracts
            WHERE region_id = $1 AND contract_id <> ALL($2)
            ",
        )
        .bind(region.value())
        .bind(&seen_ids)
        .execute(&self.pool)
        .await
        .map_err(StoreError::QueryFailed)?;

        Ok(result.rows_affected())
    }
}
