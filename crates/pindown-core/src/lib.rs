//! # PinDown Core
//!
//! Pure primitives for PinDown: certification records, identities, store
//! addresses, canonical encoding and the query engine.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Record`] - One claim: issuer, receiver, document link
//! - [`RecordId`] - Content id of a record (Blake3 hash)
//! - [`Identity`] - Opaque, comparable identity handle
//! - [`StoreAddress`] - The fixed key a deployment's ledger lives under
//!
//! ## Queries
//!
//! [`filter`] selects records by document-link substring. See [`query`].
//!
//! ## Canonicalization
//!
//! Records are encoded using deterministic CBOR. See [`canonical`] module.

pub mod address;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod query;
pub mod record;
pub mod types;
pub mod validation;

pub use address::StoreAddress;
pub use canonical::{canonical_bytes, decode_record};
pub use crypto::{Ed25519PublicKey, Keypair};
pub use error::{CoreError, ValidationError};
pub use query::{filter, filter_by_issuer, filter_by_receiver};
pub use record::Record;
pub use types::{Identity, RecordId};
pub use validation::{validate_fields, validate_record};
