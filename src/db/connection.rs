//! Database connection management
//!
//! Provides SQLite connection pooling and scoped transactions.

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OpenFlags, Transaction, TransactionBehavior};
use thiserror::Error;

/// Database error types
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Database {
    /// Create a new database connection pool
    pub fn new<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(|conn| {
                conn.execute_batch(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA busy_timeout = 5000;
                     PRAGMA cache_size = -64000;
                     PRAGMA temp_store = MEMORY;",
                )?;
                Ok(())
            });

        let pool = Pool::builder()
            .max_size(10)
            .build(manager)?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Open the pool and bring the schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let database = Self::new(path)?;
        database.with_conn(super::migrations::run_migrations)?;
        Ok(database)
    }

    /// Get a connection from the pool
    pub fn get_conn(&self) -> DbResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Execute a closure with a database connection
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }

    /// Execute a closure inside one write transaction on a dedicated connection.
    ///
    /// The write lock is taken up front (`BEGIN IMMEDIATE`).
    ///
    /// The transaction commits exactly once when the closure returns `Ok`.
    /// On any error, including a failed commit, the transaction is dropped
    /// uncommitted and SQLite rolls it back.
    pub fn with_transaction<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> DbResult<T>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}
