//! Core error types for cadence-core.
//!
//! Every engine failure is recoverable: operations return the unmodified
//! input state plus a descriptive error value, and the caller decides
//! whether to surface it. Nothing in this crate is fatal to the host.

use std::path::PathBuf;
use thiserror::Error;

/// Umbrella error type for cadence-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Engine-level precondition violations
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Precondition violations inside the temporal engine.
///
/// Negative elapsed time (clock skew) is deliberately absent: the timer
/// ledger clamps it to zero instead of reporting it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Recurrence rule fails validation (zero interval, weekday out of range)
    #[error("Invalid recurrence rule: {message}")]
    InvalidRule { message: String },

    /// Operation references an item not present in the supplied collection
    #[error("Unknown item: {id}")]
    UnknownItem { id: String },

    /// Operation references a timer session that does not exist
    #[error("Unknown timer session: {id}")]
    UnknownSession { id: String },

    /// Timer state machine rejected the transition
    #[error("Invalid timer transition: {message}")]
    InvalidTimerTransition { message: String },

    /// Completing a task that is already completed
    #[error("Task {id} is already completed")]
    InvalidCompletion { id: String },
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
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

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A persisted JSON document no longer deserializes
    #[error("Corrupt {table} record {id}: {source}")]
    CorruptRecord {
        table: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A persisted timestamp column no longer parses
    #[error("Invalid timestamp '{value}' on record {id}")]
    InvalidTimestamp { id: String, value: String },

    /// IO errors (data directory creation and friends)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
