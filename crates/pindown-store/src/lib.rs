//! # PinDown Store
//!
//! The shared record medium and the ledger contract layered on it.
//!
//! ## Overview
//!
//! The [`Backend`] trait offers three atomic primitives keyed by a
//! [`StoreAddress`](pindown_core::StoreAddress): create-if-absent, append,
//! read. [`LedgerStore`] turns them into the initialize / append / read_all
//! contract. The durable implementation is [`SqliteBackend`], with
//! [`MemoryBackend`] for tests and single-process use.
//!
//! ## Key Types
//!
//! - [`Backend`] - The async trait for the backing medium
//! - [`SqliteBackend`] - SQLite-based persistent backend
//! - [`MemoryBackend`] - In-memory backend
//! - [`LedgerStore`] - The ledger contract at one address
//! - [`LedgerError`] - NotInitialized / AlreadyInitialized / Validation / Transport
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pindown_core::Record;
//! use pindown_store::{LedgerConfig, LedgerStore, SqliteBackend};
//!
//! async fn example() {
//!     let backend = Arc::new(SqliteBackend::open("pindown.db").unwrap());
//!     let ledger = LedgerStore::from_config(backend, &LedgerConfig::default());
//!
//!     ledger.ensure_initialized().await.unwrap();
//!     let record = Record::new("issuer", "receiver", "ipfs://bafy").unwrap();
//!     ledger.append(&record).await.unwrap();
//!     let all = ledger.read_all().await.unwrap();
//!     assert!(!all.is_empty());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **At-most-once initialization**: delegated to the backend's
//!   create-if-absent; race losers see `AlreadyInitialized`
//! - **No in-process coordination**: nothing here replaces the backend's
//!   own atomicity
//! - **Duplicates allowed**: no uniqueness constraint on records

pub mod error;
pub mod ledger;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{LedgerError, Result, StoreError};
pub use ledger::{InitOutcome, LedgerConfig, LedgerStore};
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use traits::{AppendOutcome, Backend, CreateOutcome};
