//! Error types for dispatchbook.
//!
//! This module defines all error types used throughout the dispatchbook crate.
//! Collection load and save failures are recovered inside the dispatcher and
//! surfaced as notifications; the remaining variants describe database and
//! configuration failures that propagate to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for dispatchbook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Collection Errors ===
    /// A stored collection blob is not valid structured data.
    #[error("stored collection '{key}' is not valid: {source}")]
    Parse {
        /// Key of the collection that failed to parse.
        key: String,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The durable medium failed to read or write a collection.
    #[error("storage error for '{key}': {message}")]
    Storage {
        /// Key of the collection being read or written.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Database Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for dispatchbook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a parse error for the given collection key.
    #[must_use]
    pub fn parse(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            key: key.into(),
            source,
        }
    }

    /// Create a storage error for the given collection key.
    #[must_use]
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Check if this error means stored data could not be parsed.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Check if this error means the durable medium failed.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err()
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse("worksheets", json_error());
        let msg = err.to_string();
        assert!(msg.contains("worksheets"));
        assert!(err.is_parse_error());
        assert!(!err.is_storage_error());
    }

    #[test]
    fn test_storage_error_display() {
        let err = Error::storage("currentRecords", "quota exceeded");
        assert_eq!(
            err.to_string(),
            "storage error for 'currentRecords': quota exceeded"
        );
        assert!(err.is_storage_error());
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let err: Error = json_error().into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "database_path must not be empty".to_string(),
        };
        assert!(err.to_string().contains("database_path"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
