//! # Local Database Module
//!
//! This module provides local SQLite storage for the offline action queue.
//! Queued actions survive app restarts; the sync coordinator drains them once
//! connectivity returns.
//!
//! ## Key Components
//!
//! - `LocalDatabase`: connection pool and schema management
//! - `schema.rs`: schema version constants and the base schema
//! - `sync.rs`: the [`ActionStore`](crate::client::offline::queue::ActionStore)
//!   implementation and sync metadata (last online, last sync)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wolfpack_sync::client::local_db::LocalDatabase;
//! use wolfpack_sync::client::offline::queue::ActionStore;
//!
//! # async fn example() -> Result<(), wolfpack_sync::client::error::StoreError> {
//! let db = LocalDatabase::new().await?;
//! let queued = db.count().await?;
//! println!("{} actions waiting to sync", queued);
//! # Ok(())
//! # }
//! ```

pub mod schema;
pub mod sync;

pub use sync::QuarantinedAction;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

use crate::client::error::StoreResult;
use crate::client::offline::queue::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::shared::AppConfig;

/// Local database connection manager
///
/// Manages the SQLite connection pool and the schema of the action queue.
#[derive(Debug, Clone)]
pub struct LocalDatabase {
    pool: SqlitePool,
    max_payload_bytes: usize,
}

impl LocalDatabase {
    /// Open or create the database in the platform data directory
    pub async fn new() -> StoreResult<Self> {
        Self::open(Self::default_path()).await
    }

    /// Open or create the database configured in `config`
    pub async fn from_config(config: &AppConfig) -> StoreResult<Self> {
        let path = config
            .database_path
            .clone()
            .unwrap_or_else(Self::default_path);
        let mut db = Self::open(path).await?;
        db.max_payload_bytes = config.max_payload_bytes;
        Ok(db)
    }

    /// Open or create a database file
    ///
    /// Uses WAL mode so a drain can read while new actions are enqueued.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        tracing::info!("Opened local action store at {}", path.display());
        Self::with_pool(pool).await
    }

    /// Open a private in-memory database
    ///
    /// The pool holds exactly one connection that is never recycled;
    /// closing it would discard the database.
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        let db = Self {
            pool,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        };
        db.init_schema().await?;
        Ok(db)
    }

    /// Override the payload size limit
    pub fn with_max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = limit;
        self
    }

    /// Get database file path
    ///
    /// Returns the platform-specific path for the local database file.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push("wolfpack");
        path.push("offline.db");
        path
    }

    /// Initialize database schema
    async fn init_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(schema::SCHEMA_SQL).execute(&self.pool).await?;
        self.run_migrations().await
    }

    /// Apply pending schema migrations
    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        let (current_version,): (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        if !schema::needs_migration(current_version) {
            tracing::debug!("Local schema is current (v{})", current_version);
            return Ok(());
        }

        for version in schema::get_pending_migrations(current_version) {
            let mut tx = self.pool.begin().await?;
            if let Some(ddl) = schema::migration_sql(version) {
                sqlx::raw_sql(ddl).execute(&mut *tx).await?;
            }
            sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                .bind(version)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            tracing::debug!("Applied local schema migration {}", version);
        }

        Ok(())
    }

    /// Get connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Payload size limit enforced on enqueue
    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }

    /// Get database statistics
    pub async fn get_stats(&self) -> StoreResult<DatabaseStats> {
        let (pending,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_actions")
            .fetch_one(&self.pool)
            .await?;
        let (failing,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pending_actions WHERE attempts > 0")
                .fetch_one(&self.pool)
                .await?;
        let (quarantined,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM quarantined_actions")
            .fetch_one(&self.pool)
            .await?;
        let (schema_version,): (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        Ok(DatabaseStats {
            pending_actions: pending as u64,
            failing_actions: failing as u64,
            quarantined_actions: quarantined as u64,
            schema_version,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Actions waiting to sync
    pub pending_actions: u64,
    /// Queued actions with at least one failed attempt
    pub failing_actions: u64,
    /// Undecodable rows moved out of the queue
    pub quarantined_actions: u64,
    /// Applied schema version
    pub schema_version: i32,
}
