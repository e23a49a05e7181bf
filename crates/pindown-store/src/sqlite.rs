//! SQLite implementation of the Backend trait.
//!
//! This is the durable backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking. Several processes may open
//! the same file; SQLite's write lock is what serializes their appends.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use pindown_core::{canonical_bytes, decode_record, Record, RecordId, StoreAddress};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{AppendOutcome, Backend, CreateOutcome};

/// How long a connection waits on another process's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based backend.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteBackend {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` on the connection from the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("sqlite connection: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn ledger_exists(conn: &Connection, address: &[u8]) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM ledgers WHERE address = ?1",
            params![address],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Rebuild a record from its stored canonical bytes, checking the stored id.
fn row_to_record(canonical: &[u8], stored_id: &[u8]) -> Result<Record> {
    let record = decode_record(canonical)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

    let stored_id = RecordId::try_from(stored_id)
        .map_err(|_| StoreError::InvalidData("record_id is not 32 bytes".into()))?;
    if record.compute_id() != stored_id {
        return Err(StoreError::InvalidData(format!(
            "record {} does not match its canonical bytes",
            stored_id
        )));
    }

    Ok(record)
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn create_if_absent(&self, address: &StoreAddress) -> Result<CreateOutcome> {
        let address = *address;

        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO ledgers (address, created_at) VALUES (?1, ?2)",
                params![address.as_bytes().as_slice(), now_millis()],
            )?;

            Ok(if inserted == 1 {
                CreateOutcome::Created
            } else {
                CreateOutcome::AlreadyExists
            })
        })
        .await
    }

    async fn append(&self, address: &StoreAddress, record: &Record) -> Result<AppendOutcome> {
        let address = *address;
        let record = record.clone();

        self.with_conn(move |conn| {
            // IMMEDIATE takes the write lock up front, so the existence check,
            // the position read and the insert see one consistent state.
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let addr = address.as_bytes().as_slice();

            if !ledger_exists(&tx, addr)? {
                return Ok(AppendOutcome::Missing);
            }

            let position: i64 = tx.query_row(
                "SELECT COALESCE(MAX(position), 0) + 1 FROM records WHERE address = ?1",
                params![addr],
                |row| row.get(0),
            )?;

            let canonical = canonical_bytes(&record);
            let record_id = record.compute_id();

            tx.execute(
                "INSERT INTO records (
                    address, position, issuer, receiver, document_link,
                    record_id, canonical_bytes, accepted_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    addr,
                    position,
                    record.issuer().as_str(),
                    record.receiver().as_str(),
                    record.document_link(),
                    record_id.as_bytes().as_slice(),
                    canonical,
                    now_millis(),
                ],
            )?;

            tx.commit()?;

            Ok(AppendOutcome::Appended {
                position: position as u64,
            })
        })
        .await
    }

    async fn read(&self, address: &StoreAddress) -> Result<Option<Vec<Record>>> {
        let address = *address;

        self.with_conn(move |conn| {
            // One read transaction so the existence check and the rows agree.
            let tx = conn.transaction()?;
            let addr = address.as_bytes().as_slice();

            if !ledger_exists(&tx, addr)? {
                return Ok(None);
            }

            let rows: Vec<(Vec<u8>, Vec<u8>)> = {
                let mut stmt = tx.prepare(
                    "SELECT canonical_bytes, record_id FROM records
                     WHERE address = ?1 ORDER BY position",
                )?;
                let rows = stmt
                    .query_map(params![addr], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            };
            tx.commit()?;

            let records = rows
                .iter()
                .map(|(canonical, id)| row_to_record(canonical, id))
                .collect::<Result<Vec<_>>>()?;

            Ok(Some(records))
        })
        .await
    }

    async fn exists(&self, address: &StoreAddress) -> Result<bool> {
        let address = *address;
        self.with_conn(move |conn| ledger_exists(conn, address.as_bytes().as_slice()))
            .await
    }
}
