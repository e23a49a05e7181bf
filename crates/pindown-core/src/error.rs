//! Error types for PinDown Core.

use thiserror::Error;

/// Core errors raised while encoding or decoding records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),
}

/// Reasons a record is refused before it reaches a ledger.
///
/// A record is never persisted with an empty field; each variant names the
/// field that was missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("document link is empty")]
    EmptyDocumentLink,

    #[error("receiver is not set")]
    MissingReceiver,

    #[error("issuer is not set")]
    MissingIssuer,
}
