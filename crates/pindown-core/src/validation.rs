//! Record validation: the construction contract.
//!
//! Emptiness is checked on the exact text; a link of spaces is not empty.

use crate::error::ValidationError;
use crate::record::Record;
use crate::types::Identity;

/// Check the three record fields.
///
/// The document link is checked first, then the receiver, then the issuer.
pub fn validate_fields(
    issuer: &Identity,
    receiver: &Identity,
    document_link: &str,
) -> Result<(), ValidationError> {
    if document_link.is_empty() {
        return Err(ValidationError::EmptyDocumentLink);
    }
    if receiver.is_empty() {
        return Err(ValidationError::MissingReceiver);
    }
    if issuer.is_empty() {
        return Err(ValidationError::MissingIssuer);
    }
    Ok(())
}

/// Re-check an already built record.
///
/// Records built through [`Record::new`] or deserialization always pass; the
/// ledger calls this anyway before handing a record to its backend.
pub fn validate_record(record: &Record) -> Result<(), ValidationError> {
    validate_fields(record.issuer(), record.receiver(), record.document_link())
}
