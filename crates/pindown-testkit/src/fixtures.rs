//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: one shared backend, many
//! sessions.

use std::sync::Arc;

use pindown::{KeypairProvider, Session, SessionConfig};
use pindown_core::{Identity, Keypair};
use pindown_store::{Backend, LedgerConfig, LedgerStore, MemoryBackend};

/// A shared backend plus the deployment it serves.
pub struct TestFixture<B: Backend> {
    pub backend: Arc<B>,
    pub config: LedgerConfig,
}

impl TestFixture<MemoryBackend> {
    /// A fixture over a fresh in-memory backend.
    pub fn new() -> Self {
        Self::with_backend(MemoryBackend::new())
    }
}

impl Default for TestFixture<MemoryBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> TestFixture<B> {
    /// A fixture over `backend` with the default deployment.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            config: LedgerConfig::default(),
        }
    }

    /// A handle on the shared ledger.
    pub fn ledger(&self) -> LedgerStore<B> {
        LedgerStore::from_config(Arc::clone(&self.backend), &self.config)
    }

    /// A session for party `index`, not yet connected.
    pub fn session(&self, index: u8) -> Session<B, KeypairProvider> {
        self.session_with(index, SessionConfig::default())
    }

    pub fn session_with(&self, index: u8, config: SessionConfig) -> Session<B, KeypairProvider> {
        Session::new(
            self.ledger(),
            KeypairProvider::new(party_keypair(index)),
            config,
        )
    }

    /// `count` sessions, each already connected with its own identity.
    pub async fn connected_sessions(&self, count: u8) -> Vec<Session<B, KeypairProvider>> {
        let mut sessions = Vec::with_capacity(count as usize);
        for i in 0..count {
            let mut session = self.session(i);
            session
                .connect()
                .await
                .unwrap_or_else(|e| panic!("party {} failed to connect: {}", i, e));
            sessions.push(session);
        }
        sessions
    }
}

/// Deterministic keypair for party `index`.
pub fn party_keypair(index: u8) -> Keypair {
    let mut seed = [0u8; 32];
    seed[0] = index;
    seed[31] = 0x5a;
    Keypair::from_seed(&seed)
}

/// Identities for `count` distinct parties.
pub fn multi_party_identities(count: u8) -> Vec<Identity> {
    (0..count).map(|i| party_keypair(i).identity()).collect()
}
