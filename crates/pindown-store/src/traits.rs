//! Backend trait: the three atomic primitives a ledger is layered on.
//!
//! This trait keeps the ledger storage-agnostic. Implementations include
//! SQLite (shared between processes) and in-memory (shared between tasks).

use std::sync::Arc;

use async_trait::async_trait;
use pindown_core::{Record, StoreAddress};

use crate::error::Result;

/// Result of `create_if_absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// This call created the store.
    Created,
    /// A store already lived at the address. Nothing changed.
    AlreadyExists,
}

/// Result of an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The record was accepted at this 1-based position.
    Appended { position: u64 },
    /// No store lives at the address. Nothing changed.
    Missing,
}

/// The Backend trait: async interface to the shared record medium.
///
/// # Design Notes
///
/// - **Atomic create**: when several callers race `create_if_absent` on one
///   address, exactly one sees `Created`.
/// - **Atomic append**: the existence check and the insert are one step; an
///   append never lands in a store that does not exist.
/// - **Acceptance order**: positions are contiguous per address and follow
///   the order the backend accepted appends, not the callers' clocks.
/// - **No uniqueness**: appending an equal record twice stores it twice.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Create the store at `address` unless one exists.
    async fn create_if_absent(&self, address: &StoreAddress) -> Result<CreateOutcome>;

    /// Append a record to the store at `address`.
    async fn append(&self, address: &StoreAddress, record: &Record) -> Result<AppendOutcome>;

    /// Read every record at `address` in position order.
    ///
    /// Returns `None` if no store lives there.
    async fn read(&self, address: &StoreAddress) -> Result<Option<Vec<Record>>>;

    /// Check whether a store lives at `address`.
    async fn exists(&self, address: &StoreAddress) -> Result<bool> {
        Ok(self.read(address).await?.is_some())
    }
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn create_if_absent(&self, address: &StoreAddress) -> Result<CreateOutcome> {
        (**self).create_if_absent(address).await
    }

    async fn append(&self, address: &StoreAddress, record: &Record) -> Result<AppendOutcome> {
        (**self).append(address, record).await
    }

    async fn read(&self, address: &StoreAddress) -> Result<Option<Vec<Record>>> {
        (**self).read(address).await
    }

    async fn exists(&self, address: &StoreAddress) -> Result<bool> {
        (**self).exists(address).await
    }
}
