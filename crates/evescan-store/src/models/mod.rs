//! Persisted data models.

pub mod contract;
