//! Canonical CBOR encoding for deterministic serialization.
//!
//! This module implements the subset of RFC 8949 Core Deterministic Encoding
//! that a record needs:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//!
//! The same record yields identical bytes (and thus identical ids) on every
//! platform. Backends store these bytes alongside the decoded columns.

use ciborium::value::Value;

use crate::error::CoreError;
use crate::record::Record;

/// Record field keys (integer keys for compact encoding).
mod keys {
    pub const ISSUER: u64 = 0;
    pub const RECEIVER: u64 = 1;
    pub const DOCUMENT_LINK: u64 = 2;
}

/// Encode a record to canonical CBOR bytes.
pub fn canonical_bytes(record: &Record) -> Vec<u8> {
    let entries = [
        (keys::ISSUER, record.issuer().as_str()),
        (keys::RECEIVER, record.receiver().as_str()),
        (keys::DOCUMENT_LINK, record.document_link()),
    ];
    let mut buf = Vec::new();
    encode_map_canonical(&mut buf, &entries);
    buf
}

/// Decode a record from canonical bytes.
///
/// The decoded record must pass validation and re-encode to exactly the
/// input bytes.
pub fn decode_record(bytes: &[u8]) -> Result<Record, CoreError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let map = match value {
        Value::Map(m) => m,
        _ => return Err(CoreError::MalformedRecord("expected map".into())),
    };

    let get_text = |key: u64, name: &str| -> Result<String, CoreError> {
        map.iter()
            .find(|(k, _)| *k == Value::Integer(key.into()))
            .and_then(|(_, v)| v.as_text())
            .map(String::from)
            .ok_or_else(|| CoreError::MalformedRecord(format!("missing {}", name)))
    };

    let issuer = get_text(keys::ISSUER, "issuer")?;
    let receiver = get_text(keys::RECEIVER, "receiver")?;
    let document_link = get_text(keys::DOCUMENT_LINK, "document_link")?;

    let record = Record::new(issuer, receiver, document_link)?;

    if canonical_bytes(&record) != bytes {
        return Err(CoreError::MalformedRecord("non-canonical encoding".into()));
    }

    Ok(record)
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an integer-keyed text map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(u64, &str)]) {
    let mut pairs: Vec<(Vec<u8>, &str)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_uint(&mut key_buf, 0, *k);
            (key_buf, *v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_text(buf, value);
    }
}
