//! The SQLite file shared by every kiosk at the entrance.
//!
//! Each kiosk checking a passcode holds one pooled connection for the length
//! of its transaction. The file runs in WAL mode so reports and listings keep
//! reading while a kiosk writes; writers still take turns, and a kiosk that
//! finds the write lock held waits up to `busy_timeout` before SQLite reports
//! busy and the validator retries the attempt.

use crate::error::{StorageError, StorageResult};
use sqlx::ConnectOptions;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_KIOSKS: u32 = 8;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the intercom database lives and how many kiosks share it.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,

    /// Pool size; one connection per kiosk that may validate concurrently.
    pub kiosks: u32,

    /// How long a kiosk waits on another kiosk's write lock.
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kiosks: DEFAULT_KIOSKS,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

/// Pooled handle on the residents, visitors and access log tables.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and apply the schema.
    pub async fn open(config: &DatabaseConfig) -> StorageResult<Self> {
        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Configuration(format!("{}: {e}", parent.display()))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.kiosks.max(1))
            .connect_with(options)
            .await?;

        debug!(
            path = %config.path.display(),
            kiosks = config.kiosks,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "intercom database open"
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// A private database for tests and one-off checks.
    ///
    /// Every `:memory:` connection is its own database, so the pool is held
    /// to a single connection. Callers must not touch the pool while a
    /// transaction from it is open.
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the embedded schema; safe to run on an up-to-date file.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
