//! # PinDown Testkit
//!
//! Testing utilities for PinDown.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known records with their expected canonical bytes
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: One shared backend with many sessions on it
//! - **Delayed backend**: Replies arrive late while writes still land
//!
//! ## Golden Vectors
//!
//! ```rust
//! use pindown_testkit::vectors::verify_all_vectors;
//!
//! assert!(verify_all_vectors().is_empty());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use pindown_testkit::generators::{record_from_params, RecordParams};
//!
//! proptest! {
//!     #[test]
//!     fn record_id_is_deterministic(params: RecordParams) {
//!         let r1 = record_from_params(&params);
//!         let r2 = record_from_params(&params);
//!         prop_assert_eq!(r1.compute_id(), r2.compute_id());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use pindown_testkit::fixtures::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let mut sessions = fixture.connected_sessions(3).await;
//!     sessions[0].initialize().await.unwrap();
//! }
//! ```

pub mod delayed;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use delayed::{DelayedBackend, Delays};
pub use fixtures::{multi_party_identities, party_keypair, TestFixture};
pub use generators::{record_from_params, RecordParams};
pub use vectors::{all_vectors, record_from_vector, verify_all_vectors, GoldenVector};
