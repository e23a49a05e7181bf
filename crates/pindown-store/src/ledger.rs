//! The ledger: one shared, append-only sequence of records.
//!
//! `LedgerStore` is a thin contract over a [`Backend`]. It adds no locking
//! of its own; every guarantee about racing callers comes from the
//! backend's atomic primitives.
//!
//! ```text
//! UNINITIALIZED --initialize--> INITIALIZED --append/read_all--> INITIALIZED
//! ```
//!
//! There is no way back to UNINITIALIZED.

use std::sync::Arc;

use pindown_core::{validate_record, Record, StoreAddress};

use crate::error::LedgerError;
use crate::traits::{AppendOutcome, Backend, CreateOutcome};

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Deployment-level ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Deployment name; every session of a deployment derives the same
    /// store address from it.
    pub deployment: String,
}

impl LedgerConfig {
    /// The store address for this deployment.
    pub fn address(&self) -> StoreAddress {
        StoreAddress::derive(&self.deployment)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            deployment: "pindown".to_string(),
        }
    }
}

/// Outcome of [`LedgerStore::ensure_initialized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// This caller created the ledger.
    Created,
    /// The ledger already existed (possibly created by a racing caller).
    AlreadyInitialized,
}

/// Handle on the ledger at one store address.
pub struct LedgerStore<B: Backend> {
    backend: Arc<B>,
    address: StoreAddress,
}

impl<B: Backend> Clone for LedgerStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            address: self.address,
        }
    }
}

impl<B: Backend> LedgerStore<B> {
    /// Create a handle on the ledger at `address`.
    pub fn new(backend: Arc<B>, address: StoreAddress) -> Self {
        Self { backend, address }
    }

    /// Create a handle from deployment configuration.
    pub fn from_config(backend: Arc<B>, config: &LedgerConfig) -> Self {
        Self::new(backend, config.address())
    }

    /// The store address this handle points at.
    pub fn address(&self) -> &StoreAddress {
        &self.address
    }

    /// Create the ledger with an empty record sequence.
    ///
    /// Fails with `AlreadyInitialized` if it exists, including when another
    /// caller won a race to create it.
    pub async fn initialize(&self) -> Result<()> {
        match self.backend.create_if_absent(&self.address).await? {
            CreateOutcome::Created => {
                tracing::info!(address = %self.address, "ledger initialized");
                Ok(())
            }
            CreateOutcome::AlreadyExists => {
                tracing::warn!(address = %self.address, "ledger already initialized");
                Err(LedgerError::AlreadyInitialized)
            }
        }
    }

    /// Initialize, treating `AlreadyInitialized` as ready.
    pub async fn ensure_initialized(&self) -> Result<InitOutcome> {
        match self.initialize().await {
            Ok(()) => Ok(InitOutcome::Created),
            Err(LedgerError::AlreadyInitialized) => Ok(InitOutcome::AlreadyInitialized),
            Err(e) => Err(e),
        }
    }

    /// Whether the ledger exists.
    pub async fn exists(&self) -> Result<bool> {
        Ok(self.backend.exists(&self.address).await?)
    }

    /// Append a record. Returns its 1-based position.
    ///
    /// Duplicates are allowed: an equal record appended twice appears twice.
    pub async fn append(&self, record: &Record) -> Result<u64> {
        validate_record(record)?;

        match self.backend.append(&self.address, record).await? {
            AppendOutcome::Appended { position } => {
                tracing::info!(
                    address = %self.address,
                    position,
                    record = %record.compute_id(),
                    "record appended"
                );
                Ok(position)
            }
            AppendOutcome::Missing => Err(LedgerError::NotInitialized),
        }
    }

    /// Read the full record sequence.
    ///
    /// The result is a snapshot; it does not change as later appends land.
    pub async fn read_all(&self) -> Result<Vec<Record>> {
        let records = self
            .backend
            .read(&self.address)
            .await?
            .ok_or(LedgerError::NotInitialized)?;

        tracing::debug!(address = %self.address, count = records.len(), "ledger read");
        Ok(records)
    }
}
