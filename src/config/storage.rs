//! Storage configuration: SQLite file location and connection tuning

use serde::Deserialize;
use std::path::PathBuf;

/// SQLite storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Maximum pooled connections shared by request handlers
    pub pool_size: u32,
    /// How long a connection waits on a locked database (milliseconds)
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./db.sqlite3"),
            pool_size: 4,
            busy_timeout_ms: 5000,
        }
    }
}

/// Storage settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileStorage {
    pub pool_size: Option<u32>,
    pub busy_timeout_ms: Option<u64>,
}

impl StorageConfig {
    /// Create from file config with defaults
    ///
    /// `db_path` lives at the top level of the file and is merged by the caller.
    pub fn from_file(file: Option<FileStorage>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            db_path: defaults.db_path,
            // A zero-sized pool can never hand out a connection
            pool_size: file.pool_size.unwrap_or(defaults.pool_size).max(1),
            busy_timeout_ms: file.busy_timeout_ms.unwrap_or(defaults.busy_timeout_ms),
        }
    }
}
