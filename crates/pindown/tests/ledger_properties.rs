//! Ledger and session behavior, checked against every backend.
//!
//! Each property runs once on the in-memory backend and once on SQLite, so
//! both honor the same contract.

use std::sync::Arc;

use pindown::core::filter;
use pindown::store::{Backend, MemoryBackend, SqliteBackend};
use pindown::{
    InitOutcome, LedgerConfig, LedgerError, LedgerStore, LocalView, Record, RecordInput, Session,
    SessionConfig, SessionError, StaticProvider, ValidationError,
};

fn ledger<B: Backend>(backend: B) -> LedgerStore<B> {
    LedgerStore::from_config(Arc::new(backend), &LedgerConfig::default())
}

fn session<B: Backend>(ledger: LedgerStore<B>, who: &str) -> Session<B, StaticProvider> {
    Session::new(ledger, StaticProvider::new(who), SessionConfig::default())
}

async fn appends_keep_submission_order<B: Backend>(ledger: LedgerStore<B>) {
    ledger.initialize().await.unwrap();

    let r1 = Record::new("U1", "U2", "first.pdf").unwrap();
    let r2 = Record::new("U1", "U3", "second.pdf").unwrap();
    ledger.append(&r1).await.unwrap();
    ledger.append(&r2).await.unwrap();

    let all = ledger.read_all().await.unwrap();
    let p1 = all.iter().position(|r| r == &r1).unwrap();
    let p2 = all.iter().position(|r| r == &r2).unwrap();
    assert!(p1 <= p2);
}

async fn second_initialize_is_rejected<B: Backend>(ledger: LedgerStore<B>) {
    ledger.initialize().await.unwrap();
    ledger
        .append(&Record::new("U1", "U2", "doc.pdf").unwrap())
        .await
        .unwrap();
    let before = ledger.read_all().await.unwrap();

    assert!(matches!(
        ledger.initialize().await,
        Err(LedgerError::AlreadyInitialized)
    ));
    assert_eq!(ledger.read_all().await.unwrap(), before);
}

async fn append_before_initialize_changes_nothing<B: Backend>(ledger: LedgerStore<B>) {
    let record = Record::new("U1", "U2", "doc.pdf").unwrap();
    for _ in 0..3 {
        assert!(matches!(
            ledger.append(&record).await,
            Err(LedgerError::NotInitialized)
        ));
    }
    assert!(!ledger.exists().await.unwrap());

    ledger.initialize().await.unwrap();
    assert!(ledger.read_all().await.unwrap().is_empty());
}

async fn read_all_is_idempotent<B: Backend>(ledger: LedgerStore<B>) {
    ledger.initialize().await.unwrap();
    for link in ["a.pdf", "b.pdf"] {
        ledger
            .append(&Record::new("U1", "U2", link).unwrap())
            .await
            .unwrap();
    }

    assert_eq!(
        ledger.read_all().await.unwrap(),
        ledger.read_all().await.unwrap()
    );
}

async fn record_round_trips<B: Backend>(ledger: LedgerStore<B>) {
    ledger.initialize().await.unwrap();
    let original = Record::new("U1", "U2", "doc.pdf").unwrap();
    ledger.append(&original).await.unwrap();

    let all = ledger.read_all().await.unwrap();
    assert_eq!(all, vec![original.clone()]);
    assert_eq!(all[0].compute_id(), original.compute_id());
}

async fn duplicates_are_kept<B: Backend>(ledger: LedgerStore<B>) {
    ledger.initialize().await.unwrap();
    let record = Record::new("U1", "U2", "doc.pdf").unwrap();

    assert_eq!(ledger.append(&record).await.unwrap(), 1);
    assert_eq!(ledger.append(&record).await.unwrap(), 2);
    assert_eq!(ledger.read_all().await.unwrap(), vec![record.clone(), record]);
}

async fn any_issuer_label_is_accepted<B: Backend>(ledger: LedgerStore<B>) {
    // Issuer labels are not tied to whoever performs the append.
    ledger.initialize().await.unwrap();
    let forged = Record::new("someone-else", "U2", "doc.pdf").unwrap();
    ledger.append(&forged).await.unwrap();
    assert_eq!(ledger.read_all().await.unwrap(), vec![forged]);
}

async fn session_end_to_end<B: Backend>(ledger: LedgerStore<B>) {
    let mut alice = session(ledger.clone(), "alice");
    let mut bob = session(ledger, "bob");

    alice.connect().await.unwrap();
    bob.connect().await.unwrap();
    assert!(alice.view().is_uninitialized());

    // Both race through the initialize path; one creates, one finds it ready.
    let a = alice.initialize().await.unwrap();
    let b = bob.initialize().await.unwrap();
    assert_eq!(a, InitOutcome::Created);
    assert_eq!(b, InitOutcome::AlreadyInitialized);
    assert_eq!(bob.view(), &LocalView::Loaded(vec![]));

    alice
        .submit(RecordInput::new("ipfs://bafy/a.pdf", "bob"))
        .await
        .unwrap();

    // Bob's view is a snapshot until he refreshes.
    assert_eq!(bob.view(), &LocalView::Loaded(vec![]));
    bob.refresh().await.unwrap();
    assert_eq!(bob.view().records().unwrap().len(), 1);
    assert_eq!(bob.search("a.pdf")[0].issuer().as_str(), "alice");
}

async fn session_rejects_empty_fields<B: Backend>(ledger: LedgerStore<B>) {
    let mut session = session(ledger.clone(), "U1");
    session.connect().await.unwrap();
    session.initialize().await.unwrap();

    let err = session.submit(RecordInput::new("", "U2")).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Validation(ValidationError::EmptyDocumentLink)
    ));
    let err = session
        .submit(RecordInput::new("doc.pdf", ""))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Validation(ValidationError::MissingReceiver)
    ));

    assert!(ledger.read_all().await.unwrap().is_empty());
}

macro_rules! backend_suite {
    ($name:ident, $make:expr) => {
        mod $name {
            use super::*;

            #[tokio::test]
            async fn appends_keep_submission_order() {
                super::appends_keep_submission_order(ledger($make)).await;
            }

            #[tokio::test]
            async fn second_initialize_is_rejected() {
                super::second_initialize_is_rejected(ledger($make)).await;
            }

            #[tokio::test]
            async fn append_before_initialize_changes_nothing() {
                super::append_before_initialize_changes_nothing(ledger($make)).await;
            }

            #[tokio::test]
            async fn read_all_is_idempotent() {
                super::read_all_is_idempotent(ledger($make)).await;
            }

            #[tokio::test]
            async fn record_round_trips() {
                super::record_round_trips(ledger($make)).await;
            }

            #[tokio::test]
            async fn duplicates_are_kept() {
                super::duplicates_are_kept(ledger($make)).await;
            }

            #[tokio::test]
            async fn any_issuer_label_is_accepted() {
                super::any_issuer_label_is_accepted(ledger($make)).await;
            }

            #[tokio::test]
            async fn session_end_to_end() {
                super::session_end_to_end(ledger($make)).await;
            }

            #[tokio::test]
            async fn session_rejects_empty_fields() {
                super::session_rejects_empty_fields(ledger($make)).await;
            }
        }
    };
}

backend_suite!(memory, MemoryBackend::new());
backend_suite!(sqlite, SqliteBackend::open_memory().unwrap());

#[test]
fn filter_examples() {
    let records: Vec<Record> = ["a.pdf", "b.pdf", "abc.pdf"]
        .into_iter()
        .map(|link| Record::new("U1", "U2", link).unwrap())
        .collect();

    assert_eq!(
        filter(&records, "a"),
        vec![records[0].clone(), records[2].clone()]
    );
    assert!(filter(&records, "").is_empty());
}

#[tokio::test]
async fn sqlite_file_shared_between_handles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pindown.db");

    let writer = ledger(SqliteBackend::open(&path).unwrap());
    let reader = ledger(SqliteBackend::open(&path).unwrap());

    writer.initialize().await.unwrap();
    assert!(matches!(
        reader.initialize().await,
        Err(LedgerError::AlreadyInitialized)
    ));

    let record = Record::new("U1", "U2", "doc.pdf").unwrap();
    writer.append(&record).await.unwrap();
    assert_eq!(reader.read_all().await.unwrap(), vec![record]);
}
