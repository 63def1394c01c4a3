//! Error types for the evescan-store crate.
//!
//! Wraps `sqlx` errors with enough context to tell a connection problem from
//! a failed statement.

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to establish or acquire a database connection.
    #[error("database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// The schema bootstrap failed to apply.
    #[error("schema bootstrap failed: {0}")]
    SchemaFailed(#[source] sqlx::Error),

    /// A query failed to execute.
    #[error("query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),

    /// A flush transaction could not be committed.
    #[error("transaction failed: {0}")]
    TransactionFailed(#[source] sqlx::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
