//! Error types for the store module.

use pindown_core::ValidationError;
use thiserror::Error;

/// Errors raised by a backend: the store was unreachable or refused the call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A blocking task died before finishing.
    #[error("background task failed: {0}")]
    Task(String),

    /// A lock was poisoned by a panicking holder.
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from the ledger contract.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger has not been created yet.
    #[error("ledger is not initialized")]
    NotInitialized,

    /// Someone else created the ledger first. Not fatal.
    #[error("ledger is already initialized")]
    AlreadyInitialized,

    /// The record failed its construction contract.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The backing store was unreachable or rejected the call.
    #[error("transport error: {0}")]
    Transport(#[from] StoreError),
}
