//! Core error types for tomato-core.
//!
//! Collaborator failures (ledger, wake lock, notifications) are recovered
//! where they happen and only logged; these types describe them so the
//! recovery sites can log something precise.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tomato-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Ledger persistence errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Errors raised by a key-value store backing the daily ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The backing store could not be read or written
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The persisted record is not valid JSON
    #[error("Corrupt daily record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Config file exists but could not be read
    #[error("Failed to read configuration from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Key does not exist in the configuration
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Timer settings validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A duration was zero
    #[error("Invalid value for '{field}': duration must be at least one second")]
    ZeroDuration { field: &'static str },

    /// Long break interval was zero
    #[error("Invalid value for 'long_break_interval': must be at least 1")]
    ZeroInterval,

    /// Daily goal was zero
    #[error("Invalid value for 'daily_goal': must be at least 1")]
    ZeroGoal,
}

/// Wake lock acquisition/release errors.
#[derive(Error, Debug)]
pub enum WakeLockError {
    /// No inhibitor is available on this platform
    #[error("wake lock not supported on this platform")]
    Unsupported,

    /// The inhibitor process could not be started or stopped
    #[error("wake lock {action} failed: {source}")]
    Process {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Notification playback errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// No sound player or sound file was found
    #[error("no sound player available")]
    NoPlayer,

    /// Writing the cue failed
    #[error("notification failed: {0}")]
    Io(#[from] std::io::Error),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<DatabaseError> for LedgerError {
    fn from(err: DatabaseError) -> Self {
        LedgerError::Unavailable(err.to_string())
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
