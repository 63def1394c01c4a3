//! # evescan-core
//!
//! Shared identifier types for the evescan workspace.
//!
//! Contract and region identifiers are assigned by the remote API and are
//! plain 64-bit integers on the wire; the newtypes here keep them from being
//! swapped for one another at compile time.

pub mod ids;

pub use ids::{ContractId, RegionId};
