//! Record: one certification claim.
//!
//! A record says "`issuer` issued the document at `document_link` to
//! `receiver`". It is a pure value: once built it never changes, and two
//! records with the same three fields are equal.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_bytes;
use crate::error::ValidationError;
use crate::types::{Identity, RecordId};
use crate::validation::validate_fields;

/// Domain separator for record ids.
pub const ID_DOMAIN: &[u8] = b"pindown-record-v0:";

/// An immutable certification claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RecordFields")]
pub struct Record {
    issuer: Identity,
    receiver: Identity,
    document_link: String,
}

impl Record {
    /// Build a record, rejecting empty fields.
    pub fn new(
        issuer: impl Into<Identity>,
        receiver: impl Into<Identity>,
        document_link: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let issuer = issuer.into();
        let receiver = receiver.into();
        let document_link = document_link.into();

        validate_fields(&issuer, &receiver, &document_link)?;

        Ok(Self {
            issuer,
            receiver,
            document_link,
        })
    }

    /// The party asserting the claim.
    pub fn issuer(&self) -> &Identity {
        &self.issuer
    }

    /// The intended recipient. Caller-supplied and never verified.
    pub fn receiver(&self) -> &Identity {
        &self.receiver
    }

    /// Reference to the document (URL, hash, or content address).
    pub fn document_link(&self) -> &str {
        &self.document_link
    }

    /// Compute the content id of this record.
    pub fn compute_id(&self) -> RecordId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ID_DOMAIN);
        hasher.update(&canonical_bytes(self));
        RecordId(*hasher.finalize().as_bytes())
    }
}

/// Unchecked wire shape, validated on the way into a [`Record`].
#[derive(Deserialize)]
struct RecordFields {
    issuer: Identity,
    receiver: Identity,
    document_link: String,
}

impl TryFrom<RecordFields> for Record {
    type Error = ValidationError;

    fn try_from(fields: RecordFields) -> Result<Self, Self::Error> {
        Record::new(fields.issuer, fields.receiver, fields.document_link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let r1 = Record::new("U1", "U2", "doc.pdf").unwrap();
        let r2 = Record::new("U1", "U2", "doc.pdf").unwrap();
        assert_eq!(r1, r2);
        assert_eq!(r1.compute_id(), r2.compute_id());

        let r3 = Record::new("U1", "U3", "doc.pdf").unwrap();
        assert_ne!(r1, r3);
        assert_ne!(r1.compute_id(), r3.compute_id());
    }

    #[test]
    fn test_empty_link_rejected() {
        assert_eq!(
            Record::new("U1", "U2", ""),
            Err(ValidationError::EmptyDocumentLink)
        );
    }

    #[test]
    fn test_missing_receiver_rejected() {
        assert_eq!(
            Record::new("U1", "", "doc.pdf"),
            Err(ValidationError::MissingReceiver)
        );
    }

    #[test]
    fn test_missing_issuer_rejected() {
        assert_eq!(
            Record::new("", "U2", "doc.pdf"),
            Err(ValidationError::MissingIssuer)
        );
    }

    #[test]
    fn test_accessors() {
        let record = Record::new("U1", "U2", "ipfs://bafy").unwrap();
        assert_eq!(record.issuer().as_str(), "U1");
        assert_eq!(record.receiver().as_str(), "U2");
        assert_eq!(record.document_link(), "ipfs://bafy");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Record = serde_json::from_str(
            r#"{"issuer":"U1","receiver":"U2","document_link":"doc.pdf"}"#,
        )
        .unwrap();
        assert_eq!(ok, Record::new("U1", "U2", "doc.pdf").unwrap());

        let bad = serde_json::from_str::<Record>(
            r#"{"issuer":"U1","receiver":"U2","document_link":""}"#,
        );
        assert!(bad.is_err());
    }
}
