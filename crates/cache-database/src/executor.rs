//! Async SQLite executor using a dedicated background thread.
//!
//! - One thread owns the connection; callers send closures through a
//!   channel and await the result, so the tokio workers never block.
//! - Closures run in FIFO order. Since SQLite serializes writers anyway, this
//!   also serializes every reconciliation transaction against the cache.
//! - Only SQL belongs inside [`AsyncDatabase::call`] and
//!   [`AsyncDatabase::transaction`]. No network, no heavy decoding.

use crate::{migrations, DatabaseError, DatabaseResult};
use rusqlite::{Transaction, TransactionBehavior};
use std::path::Path;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

const IN_MEMORY_PATH: &str = ":memory:";

/// Convert a tokio_rusqlite::Error to DatabaseError.
fn from_tokio_rusqlite(e: tokio_rusqlite::Error) -> DatabaseError {
    match e {
        tokio_rusqlite::Error::Rusqlite(e) => DatabaseError::Sqlite(e),
        tokio_rusqlite::Error::ConnectionClosed => {
            DatabaseError::Connection("Connection closed".to_string())
        }
        other => DatabaseError::Connection(other.to_string()),
    }
}

/// Runs `f` inside an immediate transaction on the executor thread.
///
/// Any error from `f` drops the transaction, which rolls it back.
fn run_in_transaction<F, T>(conn: &mut rusqlite::Connection, f: F) -> DatabaseResult<T>
where
    F: FnOnce(&Transaction<'_>) -> DatabaseResult<T>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

/// Async SQLite database with a dedicated executor thread.
///
/// Cheap to clone; every clone talks to the same executor thread.
#[derive(Clone)]
pub struct AsyncDatabase {
    conn: Connection,
    path: String,
}

impl AsyncDatabase {
    /// Open the cache database at the given path.
    ///
    /// Creates the file and parent directory if needed, enables WAL and
    /// runs pending migrations before returning.
    pub async fn open(path: &Path) -> DatabaseResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let path_str = path.to_string_lossy().to_string();
        info!(path = %path_str, "Opening cache database");

        let conn = Connection::open(path)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let db = Self {
            conn,
            path: path_str,
        };
        db.call_sqlite(|conn| {
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA cache_size = -16000;
                PRAGMA temp_store = MEMORY;
                PRAGMA busy_timeout = 5000;
                ",
            )
        })
        .await?;
        db.call(|conn| migrations::run_migrations(conn)).await?;

        info!(path = %db.path, "Cache database initialized with WAL mode");
        Ok(db)
    }

    /// Open a private in-memory database with the full schema.
    pub async fn open_in_memory() -> DatabaseResult<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let db = Self {
            conn,
            path: IN_MEMORY_PATH.to_string(),
        };
        db.call(|conn| migrations::run_migrations(conn)).await?;
        Ok(db)
    }

    /// Execute a closure on the database connection.
    ///
    /// The closure runs on the dedicated SQLite thread; the caller's task is
    /// parked (not blocked) until the result is ready. Statements run in
    /// autocommit mode, use [`transaction`](Self::transaction) for anything
    /// that must be atomic.
    pub async fn call<F, T>(&self, f: F) -> DatabaseResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DatabaseResult<T> + Send + 'static,
        T: Send + 'static,
    {
        // The executor only speaks tokio_rusqlite::Error, so our own result
        // rides inside its Ok variant and is unwrapped here.
        let outer_result = self.conn.call(move |conn| Ok(f(conn))).await;

        match outer_result {
            Ok(inner) => inner,
            Err(e) => Err(from_tokio_rusqlite(e)),
        }
    }

    /// Execute a closure that returns a rusqlite::Result.
    pub async fn call_sqlite<F, T>(&self, f: F) -> DatabaseResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.conn
            .call(move |conn| Ok(f(conn)?))
            .await
            .map_err(from_tokio_rusqlite)
    }

    /// Execute a closure inside one immediate transaction.
    ///
    /// Commits when the closure returns `Ok`; rolls back when it returns
    /// `Err`, leaving the database exactly as it was before the call.
    pub async fn transaction<F, T>(&self, f: F) -> DatabaseResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> DatabaseResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let outer_result = self
            .conn
            .call(move |conn| Ok(run_in_transaction(conn, f)))
            .await;

        match outer_result {
            Ok(inner) => inner,
            Err(e) => Err(from_tokio_rusqlite(e)),
        }
    }

    /// Get the database file path (`:memory:` for in-memory databases).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check if the database is healthy by executing a simple query.
    pub async fn health_check(&self) -> DatabaseResult<()> {
        self.call_sqlite(|conn| conn.execute_batch("SELECT 1")).await?;
        debug!("Database health check passed");
        Ok(())
    }

    /// Close the connection after pending calls finish, then stop the executor thread.
    pub async fn close(self) -> DatabaseResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| DatabaseError::Connection(format!("Failed to close database: {:?}", e)))?;
        info!(path = %self.path, "Database closed");
        Ok(())
    }
}
