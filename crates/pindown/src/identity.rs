//! Identity providers: where a session gets its issuer identity.
//!
//! A provider stands in for a wallet. `connect` may ask the user for
//! consent; `try_silent_connect` only succeeds when the user already
//! trusts this application and is used on cold start.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pindown_core::{Identity, Keypair};
use thiserror::Error;

/// Why no identity could be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No wallet or identity provider is available.
    #[error("no wallet/identity available")]
    Unavailable,

    /// The user declined the connection request.
    #[error("identity request declined")]
    Declined,

    /// The session has not connected an identity yet.
    #[error("not connected")]
    NotConnected,
}

/// Source of caller identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Connect, prompting for consent if needed.
    async fn connect(&self) -> Result<Identity, IdentityError>;

    /// Reconnect without prompting. `None` if that is not possible.
    async fn try_silent_connect(&self) -> Option<Identity>;
}

/// A provider backed by a local keypair.
///
/// After one successful `connect` the application counts as trusted and
/// silent reconnects succeed.
#[derive(Debug)]
pub struct KeypairProvider {
    keypair: Keypair,
    consents: bool,
    trusted: AtomicBool,
}

impl KeypairProvider {
    /// A provider that consents on `connect` and is not yet trusted.
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair,
            consents: true,
            trusted: AtomicBool::new(false),
        }
    }

    /// Mark the application as already trusted.
    pub fn trusted(self) -> Self {
        self.trusted.store(true, Ordering::SeqCst);
        self
    }

    /// Make every `connect` fail with `Declined`.
    pub fn declining(mut self) -> Self {
        self.consents = false;
        self
    }

    /// The identity this provider hands out.
    pub fn identity(&self) -> Identity {
        self.keypair.identity()
    }
}

#[async_trait]
impl IdentityProvider for KeypairProvider {
    async fn connect(&self) -> Result<Identity, IdentityError> {
        if !self.consents {
            return Err(IdentityError::Declined);
        }
        self.trusted.store(true, Ordering::SeqCst);
        Ok(self.keypair.identity())
    }

    async fn try_silent_connect(&self) -> Option<Identity> {
        self.trusted
            .load(Ordering::SeqCst)
            .then(|| self.keypair.identity())
    }
}

/// A provider with a fixed identity, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    identity: Option<Identity>,
}

impl StaticProvider {
    /// Always hand out `identity`.
    pub fn new(identity: impl Into<Identity>) -> Self {
        Self {
            identity: Some(identity.into()),
        }
    }

    /// Model a machine with no wallet installed.
    pub fn unavailable() -> Self {
        Self { identity: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticProvider {
    async fn connect(&self) -> Result<Identity, IdentityError> {
        self.identity.clone().ok_or(IdentityError::Unavailable)
    }

    async fn try_silent_connect(&self) -> Option<Identity> {
        self.identity.clone()
    }
}
