//! Contract record model.
//!
//! [`ContractRecord`] is the normalized, typed projection of one raw remote
//! contract, built fresh every cycle and never mutated after construction.
//! [`SnapshotEntry`] is the trimmed per-contract view the reconciler diffs
//! against; the store's SQL comparison remains the authoritative change
//! check.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use evescan_core::{ContractId, RegionId};

/// Kind of a public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    /// Unrecognized or unreported contract kind.
    Unknown,
    /// Direct exchange of items for isk.
    ItemExchange,
    /// Auction with bidding.
    Auction,
    /// Haulage contract with collateral and reward.
    Courier,
    /// Loan contract.
    Loan,
}

impl ContractType {
    /// Convert to the database string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::ItemExchange => "item_exchange",
            Self::Auction => "auction",
            Self::Courier => "courier",
            Self::Loan => "loan",
        }
    }

    /// Parse from the remote/database string representation.
    ///
    /// Anything unrecognized collapses to [`ContractType::Unknown`] rather
    /// than failing the record.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "item_exchange" => Self::ItemExchange,
            "auction" => Self::Auction,
            "courier" => Self::Courier,
            "loan" => Self::Loan,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ContractType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized contract as written to storage.
#[derive(Debug, Clone)]
pub struct ContractRecord {
    /// Remote-assigned identifier, unique within the region.
    pub contract_id: ContractId,

    /// Contract kind.
    pub contract_type: ContractType,

    /// Contract title; empty when the issuer gave none.
    pub title: String,

    /// Region this contract was listed in.
    pub region_id: RegionId,

    /// Collateral price (couriers only).
    pub collateral: Option<Decimal>,

    /// Remuneration for the contract (couriers only).
    pub reward: Decimal,

    /// Buyout price (auctions only).
    pub buyout: Option<Decimal>,

    /// Asking price (item exchanges and auctions).
    pub price: Decimal,

    /// Volume of the contained items, in whole cubic meters.
    pub volume: i64,

    /// Character id of the issuer.
    pub issuer_id: Option<i64>,

    /// Corporation id of the issuer.
    pub issuer_corporation_id: Option<i64>,

    /// When the contract was issued; absent if the remote omitted it.
    pub date_issued: Option<DateTime<Utc>>,

    /// When the contract expires; absent if the remote omitted it.
    pub date_expired: Option<DateTime<Utc>>,

    /// Days granted to perform the contract.
    pub days_to_complete: i32,

    /// Start location (couriers).
    pub start_location_id: Option<i64>,

    /// End location (couriers).
    pub end_location_id: Option<i64>,

    /// When this cycle observed the contract.
    pub last_seen: DateTime<Utc>,

    /// Item list as a JSON array; `None` when no list has been recorded.
    pub items: Option<Value>,

    /// The raw remote payload, persisted verbatim.
    pub raw: Value,
}

impl ContractRecord {
    /// Attach a fetched item list, consuming the record.
    ///
    /// Records are immutable after construction; attaching items produces the
    /// final value handed to the batch writer.
    #[must_use]
    pub fn with_items(self, items: Vec<Value>) -> Self {
        Self {
            items: Some(Value::Array(items)),
            ..self
        }
    }
}

/// The stored state the reconciler compares an observed contract against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    /// Stored title.
    pub title: String,
    /// Stored asking price.
    pub price: Decimal,
    /// Stored volume.
    pub volume: i64,
    /// Whether an item list has been recorded for this contract.
    pub has_items: bool,
}

/// Last-persisted state for one region, keyed by contract id.
pub type Snapshot = HashMap<ContractId, SnapshotEntry>;

/// Row shape for the snapshot query.
#[derive(Debug, FromRow)]
pub(crate) struct SnapshotRow {
    pub contract_id: i64,
    pub title: String,
    pub price: Decimal,
    pub volume: i64,
    pub has_items: bool,
}

impl SnapshotRow {
    pub(crate) fn into_entry(self) -> (ContractId, SnapshotEntry) {
        (
            ContractId::new(self.contract_id),
            SnapshotEntry {
                title: self.title,
                price: self.price,
                volume: self.volume,
                has_items: self.has_items,
            },
        )
    }
}
