//! Error types for sessions.

use pindown_core::ValidationError;
use pindown_store::LedgerError;
use thiserror::Error;

use crate::identity::IdentityError;

/// Errors that can occur during session operations.
///
/// None of these is fatal: each leaves the session usable.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No identity: provider missing, user declined, or never connected.
    #[error("no identity: {0}")]
    NoIdentity(#[from] IdentityError),

    /// The input was rejected locally; the ledger was not touched.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Ledger error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// An append outlived the configured timeout. It may still land.
    ///
    /// The session re-read the ledger before returning; `possible_duplicate`
    /// is set when that read already shows an equal record, in which case a
    /// retry would likely store the claim twice.
    #[error("append outcome unknown (possible duplicate: {possible_duplicate})")]
    OutcomeUnknown { possible_duplicate: bool },

    /// The append was accepted at `position`, but the refresh after it
    /// failed. The local view is stale; do not resubmit.
    #[error("record appended at position {position}, but refresh failed: {source}")]
    AppendedRefreshFailed {
        position: u64,
        #[source]
        source: Box<SessionError>,
    },

    /// A non-append ledger call outlived the configured timeout.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

impl SessionError {
    /// True when the ledger does not exist yet and the initialize path
    /// should be offered.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, SessionError::Ledger(LedgerError::NotInitialized))
    }

    /// True for local input rejections.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SessionError::Validation(_) | SessionError::Ledger(LedgerError::Validation(_))
        )
    }

    /// True when the backing store was unreachable or refused the call.
    pub fn is_transport(&self) -> bool {
        matches!(self, SessionError::Ledger(LedgerError::Transport(_)))
    }
}

impl SessionError {
    /// Position of a record that landed despite this error, if known.
    pub fn appended_position(&self) -> Option<u64> {
        match self {
            SessionError::AppendedRefreshFailed { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
