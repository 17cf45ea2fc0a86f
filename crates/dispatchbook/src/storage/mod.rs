//! Storage layer for dispatchbook.
//!
//! Collections are kept as JSON text blobs in a durable key-value store.
//! [`Storage`] is the `SQLite`-backed store used by the binary;
//! [`MemoryStore`] is a volatile store with injectable failures.

pub mod collections;
pub mod memory;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use collections::{load_collection, save_collection, Collection, Loaded};
pub use memory::MemoryStore;

/// A durable medium holding text blobs under string keys.
pub trait KeyValueStore {
    /// Read the blob stored under `key`, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the medium rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// `SQLite`-backed key-value store.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_entries: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;

        let last_write: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM entries ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let last_write = last_write
            .and_then(|s| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").ok())
            .map(|dt| dt.and_utc());

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_entries,
            last_write,
            db_size_bytes,
        })
    }
}

impl KeyValueStore for Storage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| Error::storage(key, e.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                r"
                INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                ",
                params![key, value],
            )
            .map_err(|e| Error::storage(key, e.to_string()))?;
        debug!("Wrote {} bytes under {}", value.len(), key);
        Ok(())
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of stored keys.
    pub total_entries: i64,
    /// When any entry was last written.
    pub last_write: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_get_absent_key() {
        let storage = create_test_storage();
        assert_eq!(storage.get("currentRecords").unwrap(), None);
    }

    #[test]
    fn test_set_and_get() {
        let storage = create_test_storage();
        storage.set("titularDrivers", "[]").unwrap();
        assert_eq!(
            storage.get("titularDrivers").unwrap(),
            Some("[]".to_string())
        );
    }

    #[test]
    fn test_set_overwrites() {
        let storage = create_test_storage();
        storage.set("worksheets", "[]").unwrap();
        storage.set("worksheets", r#"[{"id":"1"}]"#).unwrap();
        assert_eq!(
            storage.get("worksheets").unwrap(),
            Some(r#"[{"id":"1"}]"#.to_string())
        );
        assert_eq!(storage.stats().unwrap().total_entries, 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let storage = create_test_storage();
        storage.set("currentRecords", "[1]").unwrap();
        storage.set("worksheets", "[2]").unwrap();
        assert_eq!(storage.get("currentRecords").unwrap().as_deref(), Some("[1]"));
        assert_eq!(storage.get("worksheets").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_unicode_value() {
        let storage = create_test_storage();
        let value = r#"[{"observations":"Entregado en portería, ñandú"}]"#;
        storage.set("currentRecords", value).unwrap();
        assert_eq!(storage.get("currentRecords").unwrap().as_deref(), Some(value));
    }

    #[test]
    fn test_stats_empty() {
        let storage = create_test_storage();
        let stats = storage.stats().unwrap();

        assert_eq!(stats.total_entries, 0);
        assert!(stats.last_write.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let storage = create_test_storage();
        storage.set("currentRecords", "[]").unwrap();
        storage.set("titularDrivers", "[]").unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_entries, 2);
        assert!(stats.last_write.is_some());
    }

    #[test]
    fn test_path() {
        let storage = create_test_storage();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("book.db");

        {
            let storage = Storage::open(&db_path).unwrap();
            storage.set("currentRecords", r#"[{"id":"a"}]"#).unwrap();
            assert_eq!(storage.path(), db_path);
        }

        let storage = Storage::open(&db_path).unwrap();
        assert_eq!(
            storage.get("currentRecords").unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
        assert!(storage.stats().unwrap().db_size_bytes > 0);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested_path = dir.path().join("nested/deeper/book.db");

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());
        drop(storage);
    }

    #[test]
    fn test_storage_stats_clone() {
        let stats = StorageStats {
            total_entries: 3,
            last_write: None,
            db_size_bytes: 512,
        };
        let cloned = stats.clone();
        assert_eq!(stats, cloned);
    }
}
