//! # Sync Engine
//!
//! The contract synchronization engine: walks the paginated remote listing
//! for one region, reconciles every observed contract against the persisted
//! snapshot, writes only the deltas in batches, and tombstones contracts
//! that vanished from the listing.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐     ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ SyncWorker │────►│  SyncCycle  │────►│  PageWalker  │────►│ContractSource│
//! │ (interval) │     │ (one pass)  │     │  (per page)  │     │  (ESI API)   │
//! └────────────┘     └──────┬──────┘     └──────────────┘     └──────────────┘
//!                           │
//!                  ┌────────┴────────┐
//!                  ▼                 ▼
//!           ┌────────────┐    ┌─────────────┐
//!           │ Reconciler │    │ BatchWriter │────► SnapshotStore (Postgres)
//!           │ (classify) │    │  (flush)    │
//!           └────────────┘    └─────────────┘
//! ```
//!
//! ## Features
//!
//! - **Reconciler**: classifies each record as new / changed / unchanged and
//!   decides whether the expensive item fetch is needed
//! - **Batch Writer**: accumulates records to a threshold and flushes them as
//!   one transaction, triggering a snapshot reload
//! - **Sync Cycle**: one full walk–reconcile–flush–delete pass with timing
//!   logs and per-cycle counters
//! - **Sync Worker**: fixed-interval loop that contains cycle failures so a
//!   bad cycle never takes the process down
//! - `ContractSource` / `SnapshotStore` traits at the seams so the engine is
//!   testable without network or Postgres

pub mod config;
pub mod cycle;
pub mod error;
pub mod reconcile;
pub mod stats;
pub mod traits;
pub mod walker;
pub mod worker;
pub mod writer;

pub use config::SyncConfig;
pub use cycle::SyncCycle;
pub use error::{SyncError, SyncResult};
pub use reconcile::{reconcile, Classification, NormalizeError, Outcome};
pub use stats::CycleStats;
pub use traits::{ContractSource, SnapshotStore};
pub use walker::PageWalker;
pub use worker::{ShutdownSignal, SyncWorker};
pub use writer::BatchWriter;
