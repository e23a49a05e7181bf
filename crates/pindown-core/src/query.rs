//! Query engine: stateless filters over a snapshot of records.
//!
//! Every filter keeps input order and borrows nothing from the caller past
//! the call. An empty needle matches nothing, so a blank search never
//! returns the whole ledger.

use crate::record::Record;
use crate::types::Identity;

/// Records whose document link contains `needle` (case-sensitive).
pub fn filter(records: &[Record], needle: &str) -> Vec<Record> {
    if needle.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| r.document_link().contains(needle))
        .cloned()
        .collect()
}

/// Records issued by exactly `issuer`.
pub fn filter_by_issuer(records: &[Record], issuer: &Identity) -> Vec<Record> {
    if issuer.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| r.issuer() == issuer)
        .cloned()
        .collect()
}

/// Records addressed to exactly `receiver`.
pub fn filter_by_receiver(records: &[Record], receiver: &Identity) -> Vec<Record> {
    if receiver.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| r.receiver() == receiver)
        .cloned()
        .collect()
}
