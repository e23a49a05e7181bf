//! Proptest generators for property-based testing.

use proptest::prelude::*;

use pindown_core::{Identity, Keypair, Record};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a non-empty identity handle.
///
/// Mixes short handles with keypair-derived hex identities.
pub fn identity() -> impl Strategy<Value = Identity> {
    prop_oneof![
        "[A-Za-z0-9_]{1,12}".prop_map(Identity::new),
        keypair().prop_map(|kp| kp.identity()),
    ]
}

/// Generate a non-empty document link.
pub fn document_link() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9]{1,16}\\.pdf",
        "https://[a-z]{3,10}\\.example/[a-z0-9/]{1,24}",
        "ipfs://bafy[a-z2-7]{20,40}",
        // Anything non-empty is a valid link, whitespace included.
        "\\PC{1,24}",
    ]
}

/// Generate a needle for searching. May be empty.
pub fn needle() -> impl Strategy<Value = String> {
    "[a-z0-9./]{0,4}"
}

/// Parameters for generating a record.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub issuer: Identity,
    pub receiver: Identity,
    pub document_link: String,
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (identity(), identity(), document_link())
            .prop_map(|(issuer, receiver, document_link)| RecordParams {
                issuer,
                receiver,
                document_link,
            })
            .boxed()
    }
}

/// Build a record from parameters.
pub fn record_from_params(params: &RecordParams) -> Record {
    Record::new(
        params.issuer.clone(),
        params.receiver.clone(),
        params.document_link.clone(),
    )
    .unwrap_or_else(|e| panic!("generated params are invalid: {}", e))
}

/// Generate a valid record.
pub fn record() -> impl Strategy<Value = Record> {
    any::<RecordParams>().prop_map(|p| record_from_params(&p))
}

/// Generate a sequence of records of at most `max_len`.
pub fn records(max_len: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(record(), 0..=max_len)
}
