// SPDX-FileCopyrightText: 2026 Foundline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread: the `Database` struct IS the single writer. This is what makes
//! the per-item read-modify-write cycles in the claim queries safe — two
//! approvals for the same item cannot interleave, because every transaction
//! runs to completion on that one thread.
//!
//! Do NOT create additional Connection instances for writes.

use tokio_rusqlite::Connection;
use tracing::debug;

use foundline_core::FoundlineError;

use crate::migrations;

/// Map a tokio-rusqlite error to the retryable `Unavailable` variant.
///
/// Domain outcomes (not-found, forbidden, invalid transitions) are decided
/// inside the transaction closures and never travel through this path;
/// whatever reaches here is infrastructure failure.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> FoundlineError {
    FoundlineError::Unavailable {
        source: Box::new(e),
    }
}

/// Map a raw SQLite open failure to the retryable `Unavailable` variant.
fn open_err(e: rusqlite::Error) -> FoundlineError {
    FoundlineError::Unavailable {
        source: Box::new(e),
    }
}

/// Unwrap the call-layer envelope around a migration failure.
///
/// `run_migrations` already returns a `FoundlineError`; only the channel
/// variants of the wrapper are infrastructure failures of their own.
fn migration_err(e: tokio_rusqlite::Error<FoundlineError>) -> FoundlineError {
    match e {
        tokio_rusqlite::Error::Error(e) => e,
        other => FoundlineError::Unavailable {
            source: Box::new(other),
        },
    }
}

/// Current UTC time in the same RFC 3339 millisecond format SQLite's
/// `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` defaults produce.
pub fn now_utc() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Handle to the single SQLite connection.
///
/// Cloning shares the same background writer thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, FoundlineError> {
        let conn = Connection::open(path).await.map_err(open_err)?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(migrations::run_migrations)
            .await
            .map_err(migration_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database with migrations applied. Test use only;
    /// the data vanishes when the handle drops.
    pub async fn open_in_memory() -> Result<Self, FoundlineError> {
        let conn = Connection::open_in_memory().await.map_err(open_err)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        conn.call(migrations::run_migrations)
            .await
            .map_err(migration_err)?;
        Ok(Self { conn })
    }

    /// Access the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), FoundlineError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("open.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        assert!(path.exists());

        // All four tables exist after migration.
        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                let n = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                     AND name IN ('items', 'claims', 'claim_messages', 'notifications')",
                    [],
                    |row| row.get(0),
                )?;
                Ok(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 4);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        db.close().await.unwrap();
        drop(db);
        // Migrations must be a no-op on the second open.
        Database::open(path.to_str().unwrap(), true).await.unwrap();
    }

    #[test]
    fn now_utc_matches_sqlite_format() {
        let ts = now_utc();
        // e.g. 2026-03-01T12:34:56.789Z
        assert_eq!(ts.len(), 24);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
        assert_eq!(&ts[19..20], ".");
    }
}
