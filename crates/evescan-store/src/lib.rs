//! # evescan-store
//!
//! Postgres persistence for contract snapshots.
//!
//! This crate owns the `contracts` table: its schema, the per-region snapshot
//! view used as the diff baseline, the authoritative change-detecting upsert,
//! and the region-scoped set-difference deletion of vanished contracts.
//!
//! The store is handed an explicitly constructed [`sqlx::PgPool`] — it never
//! owns ambient global state; the pool is opened at process start and closed
//! at shutdown by the caller.

pub mod error;
pub mod models;
pub mod repository;
pub mod schema;

pub use error::{StoreError, StoreResult};
pub use models::contract::{ContractRecord, ContractType, Snapshot, SnapshotEntry};
pub use repository::ContractRepository;
pub use schema::ensure_schema;
