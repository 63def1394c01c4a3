//! Record normalization and classification.
//!
//! For each raw contract observed in the listing, decide whether it is new,
//! changed, or unchanged relative to the snapshot, and whether the expensive
//! item fetch is warranted. The change signal here is a deliberately narrow
//! heuristic over {title, price, volume}; the store's field-by-field SQL
//! comparison remains the authoritative check.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;

use evescan_core::{ContractId, RegionId};
use evescan_store::{ContractRecord, ContractType, Snapshot};

/// Monetary columns are NUMERIC(18, 2); normalizing to two decimal places
/// keeps comparisons against round-tripped stored values stable.
const MONEY_SCALE: u32 = 2;

/// How an observed record relates to the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Identifier absent from the snapshot.
    New,
    /// Present, but title, price, or volume differs.
    Changed,
    /// Present with no difference in the compared fields.
    Unchanged,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        };
        write!(f, "{s}")
    }
}

/// Result of reconciling one raw record against the snapshot.
#[derive(Debug)]
pub enum Outcome {
    /// Unchanged with items already recorded: nothing to write. Not an
    /// error — the intentional no-op that gives true no-ops zero writes.
    Skip {
        /// Identifier, still counted as seen for deletion purposes.
        contract_id: ContractId,
    },
    /// The record goes to the batch writer.
    Emit {
        record: ContractRecord,
        classification: Classification,
        /// Whether the secondary item fetch is required before writing.
        needs_items: bool,
    },
}

/// A raw record the engine cannot project into the persisted shape.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The record carries no usable identifier.
    #[error("record has no contract_id")]
    MissingContractId,

    /// A timestamp field is present but not a parseable RFC 3339 string.
    #[error("invalid timestamp in field '{field}': {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// Classify one raw record against the snapshot.
///
/// Every valid record — including skipped ones — must be added to the
/// cycle's seen-set by the caller, or unchanged contracts would be
/// tombstoned at cycle end.
pub fn reconcile(
    raw: &Value,
    snapshot: &Snapshot,
    region: RegionId,
    observed_at: DateTime<Utc>,
) -> Result<Outcome, NormalizeError> {
    let record = normalize(raw, region, observed_at)?;

    let (classification, needs_items) = match snapshot.get(&record.contract_id) {
        None => (Classification::New, true),
        Some(entry) => {
            let changed = entry.title != record.title
                || entry.price != record.price
                || entry.volume != record.volume;
            if changed {
                (Classification::Changed, true)
            } else if !entry.has_items {
                // Backfill: the row predates item collection.
                (Classification::Unchanged, true)
            } else {
                return Ok(Outcome::Skip {
                    contract_id: record.contract_id,
                });
            }
        }
    };

    Ok(Outcome::Emit {
        record,
        classification,
        needs_items,
    })
}

/// Project a raw remote record into the persisted shape.
///
/// Absent optional fields take defaults (empty title, zero price and reward,
/// unknown type); a missing timestamp yields no value rather than a
/// fabricated one. The item list is attached later, only for records that
/// need it.
pub fn normalize(
    raw: &Value,
    region: RegionId,
    observed_at: DateTime<Utc>,
) -> Result<ContractRecord, NormalizeError> {
    let contract_id = raw
        .get("contract_id")
        .and_then(Value::as_i64)
        .map(ContractId::new)
        .ok_or(NormalizeError::MissingContractId)?;

    let contract_type = raw
        .get("type")
        .and_then(Value::as_str)
        .map_or(ContractType::Unknown, ContractType::parse);

    Ok(ContractRecord {
        contract_id,
        contract_type,
        title: string_field(raw, "title"),
        region_id: region,
        collateral: opt_money_field(raw, "collateral"),
        reward: money_field(raw, "reward"),
        buyout: opt_money_field(raw, "buyout"),
        price: money_field(raw, "price"),
        volume: raw
            .get("volume")
            .and_then(Value::as_f64)
            .map_or(0, |v| v as i64),
        issuer_id: int_field(raw, "issuer_id"),
        issuer_corporation_id: int_field(raw, "issuer_corporation_id"),
        date_issued: datetime_field(raw, "date_issued")?,
        date_expired: datetime_field(raw, "date_expired")?,
        days_to_complete: raw
            .get("days_to_complete")
            .and_then(Value::as_i64)
            .map_or(0, |v| v as i32),
        start_location_id: int_field(raw, "start_location_id"),
        end_location_id: int_field(raw, "end_location_id"),
        last_seen: observed_at,
        items: None,
        raw: raw.clone(),
    })
}

fn string_field(raw: &Value, field: &str) -> String {
    raw.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn int_field(raw: &Value, field: &str) -> Option<i64> {
    raw.get(field).and_then(Value::as_i64)
}

fn money_field(raw: &Value, field: &str) -> Decimal {
    opt_money_field(raw, field).unwrap_or(Decimal::ZERO)
}

fn opt_money_field(raw: &Value, field: &str) -> Option<Decimal> {
    raw.get(field)
        .and_then(Value::as_f64)
        .and_then(Decimal::from_f64)
        .map(|d| d.round_dp(MONEY_SCALE))
}

/// Remote timestamps are RFC 3339 with a trailing literal `Z` UTC marker,
/// e.g. `2025-07-07T10:43:31Z`.
fn datetime_field(
    raw: &Value,
    field: &'static str,
) -> Result<Option<DateTime<Utc>>, NormalizeError> {
    let value = match raw.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let text = value.as_str().ok_or_else(|| NormalizeError::InvalidTimestamp {
        field,
        value: value.to_string(),
    })?;

    DateTime::parse_from_rfc3339(text)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| NormalizeError::InvalidTimestamp {
            field,
            value: text.to_string(),
        })
}
