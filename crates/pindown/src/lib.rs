//! # PinDown
//!
//! Record who sent which document to whom, on a shared append-only ledger.
//!
//! ## Overview
//!
//! A caller connects an identity, makes sure the deployment's ledger exists,
//! and submits claims of the form "issuer sent `document_link` to
//! `receiver`". Everyone reads the same ledger; nobody can edit or remove
//! what is already in it.
//!
//! - **Records**: issuer, receiver, document link. Immutable once appended.
//! - **Ledger**: one per deployment, created exactly once, in arrival order.
//! - **Session**: one caller's identity, local view and search results.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pindown::{KeypairProvider, RecordInput, Session, SessionConfig};
//! use pindown::core::Keypair;
//! use pindown::store::{LedgerConfig, LedgerStore, SqliteBackend};
//!
//! async fn example() {
//!     let backend = Arc::new(SqliteBackend::open("pindown.db").unwrap());
//!     let ledger = LedgerStore::from_config(backend, &LedgerConfig::default());
//!     let provider = KeypairProvider::new(Keypair::generate());
//!
//!     let mut session = Session::new(ledger, provider, SessionConfig::default());
//!     session.connect().await.unwrap();
//!     session.initialize().await.unwrap();
//!
//!     session
//!         .submit(RecordInput::new("ipfs://bafy.../contract.pdf", "receiver"))
//!         .await
//!         .unwrap();
//!
//!     for record in session.search("contract") {
//!         println!("{} -> {}", record.issuer(), record.receiver());
//!     }
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `pindown::core` - Records, identities, validation, search
//! - `pindown::store` - Backends and the ledger contract

pub mod config;
pub mod error;
pub mod identity;
pub mod session;

// Re-export component crates
pub use pindown_core as core;
pub use pindown_store as store;

// Re-export main types for convenience
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use identity::{IdentityError, IdentityProvider, KeypairProvider, StaticProvider};
pub use session::{LocalView, RecordInput, Session};

// Re-export commonly used lower-level types
pub use pindown_core::{Identity, Keypair, Record, RecordId, StoreAddress, ValidationError};
pub use pindown_store::{InitOutcome, LedgerConfig, LedgerError, LedgerStore};
