//! SQLite storage for samples and audit events
//!
//! Two append-only tables share one database file:
//!
//! ```text
//! records             (id, created_at, time, category_name, source, value)
//! query_handle_event  (id, created_at, category_name, values_count)
//! ```
//!
//! Every insert is its own statement and commits on its own. Concurrent
//! writers are serialized by SQLite itself (WAL journal + busy timeout); the
//! adapter adds no locking of its own.

use crate::config::StorageConfig;
use crate::ingest::models::{NewEvent, NewRecord, QueryHandleEvent, StoredRecord};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, Row};
use std::path::PathBuf;
use std::time::Duration;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY NOT NULL,
    created_at TEXT NOT NULL,
    time TEXT NOT NULL,
    category_name TEXT NOT NULL,
    source TEXT NOT NULL,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS query_handle_event (
    id INTEGER PRIMARY KEY NOT NULL,
    created_at TEXT NOT NULL,
    category_name TEXT NOT NULL,
    values_count INTEGER NOT NULL
);
"#;

/// Errors raised by the storage adapter
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Persistence operations the HTTP handlers depend on
///
/// Implementations must be shareable across request tasks.
pub trait SampleStore: Send + Sync {
    /// Append one sample, returning its assigned id
    fn insert_record(&self, record: &NewRecord) -> Result<i64, StorageError>;

    /// Append one audit event, returning its assigned id
    fn insert_event(&self, event: &NewEvent) -> Result<i64, StorageError>;

    /// All samples, most recently received first
    fn fetch_all_records(&self) -> Result<Vec<StoredRecord>, StorageError>;

    /// All audit events, most recently created first
    fn fetch_all_events(&self) -> Result<Vec<QueryHandleEvent>, StorageError>;
}

/// SQLite-backed [`SampleStore`]
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database, verify it answers, and ensure the schema
    ///
    /// Any failure here means the process cannot serve traffic.
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let manager = SqliteConnectionManager::file(&config.db_path)
            .with_init(move |conn| conn.busy_timeout(busy_timeout));
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .build(manager)?;

        let conn = pool.get()?;

        // Verify connection works
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))?;

        Self::init_schema(&conn)?;

        tracing::debug!(
            "SQLite store ready at {} (pool size {})",
            config.db_path.display(),
            config.pool_size
        );

        Ok(Self {
            pool,
            db_path: config.db_path.clone(),
        })
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &std::path::Path {
        &self.db_path
    }

    /// Apply journal settings and create both tables if absent
    fn init_schema(conn: &Connection) -> Result<(), StorageError> {
        // journal_mode returns a row, so it cannot go through execute_batch
        let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        tracing::trace!("SQLite journal mode: {}", mode);

        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get a connection from the pool
    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        Ok(self.pool.get()?)
    }

    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
        Ok(StoredRecord {
            id: row.get(0)?,
            received_at: row.get(1)?,
            sample_time: row.get(2)?,
            category_name: row.get(3)?,
            source: row.get(4)?,
            value: row.get(5)?,
        })
    }

    fn event_from_row(row: &Row<'_>) -> rusqlite::Result<QueryHandleEvent> {
        Ok(QueryHandleEvent {
            id: row.get(0)?,
            created_at: row.get(1)?,
            category_name: row.get(2)?,
            values_count: row.get(3)?,
        })
    }
}

impl SampleStore for SqliteStore {
    fn insert_record(&self, record: &NewRecord) -> Result<i64, StorageError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO records (created_at, time, category_name, source, value)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.received_at,
                record.sample_time,
                record.category_name,
                record.source,
                record.value,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::trace!("Stored record {} ({})", id, record.category_name);
        Ok(id)
    }

    fn insert_event(&self, event: &NewEvent) -> Result<i64, StorageError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO query_handle_event (created_at, category_name, values_count)
             VALUES (?1, ?2, ?3)",
            params![event.created_at, event.category_name, event.values_count],
        )?;
        let id = conn.last_insert_rowid();
        tracing::trace!("Stored query handle event {} ({})", id, event.category_name);
        Ok(id)
    }

    fn fetch_all_records(&self) -> Result<Vec<StoredRecord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, created_at, time, category_name, source, value
             FROM records
             ORDER BY created_at DESC, id DESC",
        )?;

        let records = stmt
            .query_map([], Self::record_from_row)?
            .filter_map(|row| match row {
                Ok(record) => Some(record),
                Err(e) => {
                    // Skip the row, keep the rest of the listing
                    tracing::warn!("Failed to decode record row: {}", e);
                    None
                }
            })
            .collect();

        Ok(records)
    }

    fn fetch_all_events(&self) -> Result<Vec<QueryHandleEvent>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, created_at, category_name, values_count
             FROM query_handle_event
             ORDER BY created_at DESC, id DESC",
        )?;

        let events = stmt
            .query_map([], Self::event_from_row)?
            .filter_map(|row| match row {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Failed to decode query handle event row: {}", e);
                    None
                }
            })
            .collect();

        Ok(events)
    }
}
