//! Many sessions, one ledger.
//!
//! Racing initializers, interleaved appends, and appends whose reply never
//! arrives in time.

use std::sync::Arc;
use std::time::Duration;

use pindown::store::{Backend, MemoryBackend, SqliteBackend};
use pindown::{
    InitOutcome, LedgerConfig, LedgerStore, LocalView, RecordInput, SessionConfig, SessionError,
};
use pindown_core::filter_by_issuer;
use pindown_testkit::{party_keypair, DelayedBackend, Delays, TestFixture};

const PARTIES: u8 = 8;
const PER_PARTY: usize = 10;

async fn race_initialize<B: Backend + 'static>(ledgers: Vec<LedgerStore<B>>) {
    let handles: Vec<_> = ledgers
        .into_iter()
        .map(|ledger| tokio::spawn(async move { ledger.ensure_initialized().await }))
        .collect();

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() == InitOutcome::Created {
            created += 1;
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_initialize_race_memory() {
    let fixture = TestFixture::new();
    let ledgers = (0..PARTIES).map(|_| fixture.ledger()).collect();
    race_initialize(ledgers).await;

    assert!(fixture.ledger().read_all().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_initialize_race_sqlite_separate_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");

    // One connection per party, as separate processes would have.
    let ledgers = (0..PARTIES)
        .map(|_| {
            LedgerStore::from_config(
                Arc::new(SqliteBackend::open(&path).unwrap()),
                &LedgerConfig::default(),
            )
        })
        .collect();
    race_initialize(ledgers).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_session_initialize_race() {
    let fixture = TestFixture::new();
    let sessions = fixture.connected_sessions(PARTIES).await;

    let handles: Vec<_> = sessions
        .into_iter()
        .map(|mut session| {
            tokio::spawn(async move {
                let outcome = session.initialize().await.unwrap();
                // Winner or loser, every session ends up with a loaded view.
                assert!(matches!(session.view(), LocalView::Loaded(_)));
                outcome
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == InitOutcome::Created)
            .count(),
        1
    );
}

async fn concurrent_appends<B: Backend + 'static>(fixture: TestFixture<B>) {
    fixture.ledger().initialize().await.unwrap();
    let sessions = fixture.connected_sessions(PARTIES).await;

    let handles: Vec<_> = sessions
        .into_iter()
        .map(|mut session| {
            tokio::spawn(async move {
                for n in 0..PER_PARTY {
                    session
                        .submit_without_refresh(RecordInput::new(format!("doc-{:03}.pdf", n), "R"))
                        .await
                        .unwrap();
                }
                session.refresh().await.unwrap();
                session
            })
        })
        .collect();

    for handle in handles {
        let session = handle.await.unwrap();
        assert!(!session.is_stale());
    }

    let all = fixture.ledger().read_all().await.unwrap();
    assert_eq!(all.len(), PARTIES as usize * PER_PARTY);

    // Global order is whatever the store accepted; each party's own order holds.
    for i in 0..PARTIES {
        let mine = filter_by_issuer(&all, &party_keypair(i).identity());
        let links: Vec<String> = mine.iter().map(|r| r.document_link().to_string()).collect();
        let expected: Vec<String> = (0..PER_PARTY).map(|n| format!("doc-{:03}.pdf", n)).collect();
        assert_eq!(links, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_memory() {
    concurrent_appends(TestFixture::new()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let backend = SqliteBackend::open(dir.path().join("appends.db")).unwrap();
    concurrent_appends(TestFixture::with_backend(backend)).await;
}

fn timeout_config() -> SessionConfig {
    SessionConfig {
        operation_timeout: Some(Duration::from_millis(50)),
        ..SessionConfig::default()
    }
}

#[tokio::test]
async fn test_timed_out_append_reconciles_instead_of_retrying() {
    let inner = Arc::new(MemoryBackend::new());
    let fixture = TestFixture::with_backend(DelayedBackend::slow_appends(
        Arc::clone(&inner),
        Duration::from_secs(5),
    ));
    fixture.ledger().initialize().await.unwrap();

    let mut session = fixture.session_with(0, timeout_config());
    session.connect().await.unwrap();

    let err = session
        .submit(RecordInput::new("doc.pdf", "R"))
        .await
        .unwrap_err();

    // The write landed even though the reply never came.
    assert!(matches!(
        err,
        SessionError::OutcomeUnknown {
            possible_duplicate: true
        }
    ));
    assert_eq!(session.view().records().unwrap().len(), 1);
    assert_eq!(fixture.ledger().read_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_slow_read_clears_view() {
    let inner = Arc::new(MemoryBackend::new());
    let fixture = TestFixture::with_backend(DelayedBackend::new(
        inner,
        Delays {
            read: Duration::from_secs(5),
            ..Delays::default()
        },
    ));

    let mut session = fixture.session_with(0, timeout_config());
    let err = session.connect().await.unwrap_err();
    assert!(matches!(err, SessionError::Timeout("refresh")));
    assert_eq!(session.view(), &LocalView::Unloaded);

    // The identity was still acquired.
    assert!(session.identity().is_some());
}

#[tokio::test]
async fn test_slow_create_times_out() {
    let inner = Arc::new(MemoryBackend::new());
    let fixture = TestFixture::with_backend(DelayedBackend::new(
        Arc::clone(&inner),
        Delays {
            create: Duration::from_secs(5),
            ..Delays::default()
        },
    ));

    let mut session = fixture.session_with(0, timeout_config());
    session.connect().await.unwrap();

    let err = session.initialize().await.unwrap_err();
    assert!(matches!(err, SessionError::Timeout("initialize")));

    // The session already looked again: the ledger did get created.
    assert_eq!(session.view(), &LocalView::Loaded(vec![]));
    assert!(inner.exists(&LedgerConfig::default().address()).await.unwrap());
}

#[tokio::test]
async fn test_append_kept_when_refresh_after_it_fails() {
    let inner = Arc::new(MemoryBackend::new());
    let fixture = TestFixture::with_backend(DelayedBackend::new(
        Arc::clone(&inner),
        Delays {
            read: Duration::from_secs(5),
            ..Delays::default()
        },
    ));
    fixture.ledger().initialize().await.unwrap();

    let mut session = fixture.session_with(0, timeout_config());
    // The connect refresh times out too; the identity is kept.
    assert!(session.connect().await.is_err());

    session.set_document_link("doc.pdf");
    session.set_receiver("R");
    let err = session.submit_pending().await.unwrap_err();

    assert!(matches!(
        &err,
        SessionError::AppendedRefreshFailed { position: 1, source }
            if matches!(**source, SessionError::Timeout("refresh"))
    ));
    assert_eq!(err.appended_position(), Some(1));
    assert_eq!(session.pending(), &RecordInput::default());
    assert!(session.is_stale());
    assert_eq!(session.view(), &LocalView::Unloaded);

    let landed = inner
        .read(&LedgerConfig::default().address())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(landed.len(), 1);
    assert_eq!(landed[0].document_link(), "doc.pdf");
}
