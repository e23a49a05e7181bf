//! Cryptographic primitives for PinDown.
//!
//! Wraps Ed25519 keys with strong types. Keys exist so a
//! caller can hold a wallet-style identity; records are not signed.

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Identity;

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The identity handle for this key.
    pub fn identity(&self) -> Identity {
        Identity::new(self.to_hex())
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

/// A wallet keypair.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The identity handle of this keypair (hex public key).
    pub fn identity(&self) -> Identity {
        self.public_key().identity()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let kp1 = Keypair::from_seed(&seed);
        let kp2 = Keypair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.identity(), kp2.identity());
    }

    #[test]
    fn test_keypair_identity_is_hex_public_key() {
        let keypair = Keypair::from_seed(&[0x07; 32]);
        let identity = keypair.identity();
        assert_eq!(identity.as_str().len(), 64);
        assert_eq!(identity.as_str(), keypair.public_key().to_hex());
    }

    #[test]
    fn test_generated_keypairs_differ() {
        let a = Keypair::generate();
        let b = Keypair::generate();
        assert_ne!(a.identity(), b.identity());
        assert!(format!("{:?}", a).starts_with("Keypair(Ed25519Pub("));
    }
}
