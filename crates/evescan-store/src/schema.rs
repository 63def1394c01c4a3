//! Schema definition and bootstrap for the contracts table.

use sqlx::PgPool;
use tracing::info;

use crate::error::{StoreError, StoreResult};

/// Idempotent DDL for the contracts table and its secondary indexes.
///
/// Monetary columns are `NUMERIC(18, 2)`; the item list and the raw remote
/// payload are kept as `JSONB`. A `NULL` item list means no list has been
/// recorded for the contract yet, which is what drives item backfill.
const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS contracts (
    contract_id           BIGINT PRIMARY KEY,
    type                  TEXT NOT NULL,
    title                 TEXT NOT NULL DEFAULT '',
    region_id             BIGINT NOT NULL,
    collateral            NUMERIC(18, 2),
    reward                NUMERIC(18, 2) NOT NULL DEFAULT 0,
    buyout                NUMERIC(18, 2),
    price                 NUMERIC(18, 2) NOT NULL DEFAULT 0,
    volume                BIGINT NOT NULL DEFAULT 0,
    issuer_id             BIGINT,
    issuer_corporation_id BIGINT,
    date_issued           TIMESTAMPTZ,
    date_expired          TIMESTAMPTZ,
    days_to_complete      INTEGER NOT NULL DEFAULT 0,
    start_location_id     BIGINT,
    end_location_id       BIGINT,
    items                 JSONB,
    raw_contract          JSONB,
    last_seen             TIMESTAMPTZ NOT NULL,
    created_at            TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at            TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_contracts_region ON contracts (region_id);
CREATE INDEX IF NOT EXISTS idx_contracts_expiration ON contracts (date_expired);
CREATE INDEX IF NOT EXISTS idx_contracts_region_last_seen ON contracts (region_id, last_seen);
";

/// Create the contracts table and indexes if they do not exist yet.
///
/// Called once at process start, before any worker runs.
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await
        .map_err(StoreError::SchemaFailed)?;
    info!("contracts schema ensured");
    Ok(())
}
