//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

    // Read the version inside the write lock so two processes opening the
    // same file do not both apply v1.
    let current: u32 = tx.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current < CURRENT_VERSION {
        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }
        tracing::debug!(from = current, to = CURRENT_VERSION, "migrated schema");
    }

    tx.commit()?;
    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per created ledger
        CREATE TABLE ledgers (
            address BLOB PRIMARY KEY,         -- 32 bytes, StoreAddress
            created_at INTEGER NOT NULL       -- local timestamp of creation (Unix ms)
        );

        -- Records, in acceptance order per ledger
        CREATE TABLE records (
            address BLOB NOT NULL REFERENCES ledgers(address),
            position INTEGER NOT NULL,        -- 1-based acceptance order
            issuer TEXT NOT NULL,
            receiver TEXT NOT NULL,
            document_link TEXT NOT NULL,
            record_id BLOB NOT NULL,          -- 32 bytes, content id (not unique)
            canonical_bytes BLOB NOT NULL,    -- canonical CBOR encoding
            accepted_at INTEGER NOT NULL,     -- local timestamp of acceptance

            PRIMARY KEY (address, position)
        );

        CREATE INDEX idx_records_record_id ON records(record_id);
        CREATE INDEX idx_records_issuer ON records(issuer);
        CREATE INDEX idx_records_receiver ON records(receiver);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
