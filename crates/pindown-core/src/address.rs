//! Store address: the fixed key a deployment's ledger lives under.
//!
//! Every session of a deployment derives the same address, so they all
//! reach the one shared ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte store address.
///
/// Derived from Blake3("pindown-store-v0:" || deployment).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreAddress(pub [u8; 32]);

impl StoreAddress {
    /// Derive the address for a deployment name.
    pub fn derive(deployment: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"pindown-store-v0:");
        hasher.update(deployment.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for StoreAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreAddress({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for StoreAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}
