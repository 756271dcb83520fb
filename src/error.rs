//! Error types and handling for the `ScenicQA` library

use thiserror::Error;

/// Main error type for the `ScenicQA` library
#[derive(Error, Debug)]
pub enum ScenicQaError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Storage collaborator errors (unreachable store, missing schema)
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// SQLite errors
    #[error("Database error: {source}")]
    Database {
        #[from]
        source: rusqlite::Error,
    },
}

impl ScenicQaError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether the error means the backing store could not be used at all
    #[must_use]
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, ScenicQaError::Storage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = ScenicQaError::config("bad radius");
        assert!(matches!(config_err, ScenicQaError::Config { .. }));
        assert!(config_err.to_string().contains("bad radius"));

        let storage_err = ScenicQaError::storage("connection refused");
        assert!(matches!(storage_err, ScenicQaError::Storage { .. }));
        assert!(storage_err.is_storage_unavailable());
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let err: ScenicQaError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, ScenicQaError::Database { .. }));
        assert!(!err.is_storage_unavailable());
        assert!(!ScenicQaError::config("x").is_storage_unavailable());
    }
}
