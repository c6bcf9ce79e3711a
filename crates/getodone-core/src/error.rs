//! Core error types for getodone-core.
//!
//! Each concern gets its own thiserror enum; [`CoreError`] aggregates them
//! for callers that do not care which layer failed.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for getodone-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task or preference persistence errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Text-generation backend errors
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Notification or trigger registration errors
    #[error("Scheduling error: {0}")]
    Scheduling(#[from] SchedulingError),

    /// Errors surfaced by the schedule controller
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),
}

/// Persistence errors for the task and preference blobs.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the blob failed
    #[error("Failed to access {key}: {source}")]
    Io {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Blob exists but does not match the expected shape
    #[error("Malformed {key} record: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// No task with the given id
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// The blocking read was cancelled or panicked
    #[error("Store access interrupted: {0}")]
    Interrupted(String),
}

/// Failure classes of a text-generation request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The backend answered with a non-success status.
    #[error("{0}")]
    RemoteRejected(String),

    /// Network failure, timeout, or an unreadable success body.
    #[error("Text-generation service unreachable: {0}")]
    Unreachable(String),
}

/// The platform refused to register a trigger or schedule a notification.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// Schedule state could not be persisted or read
    #[error("Failed to access schedule at {path}: {message}")]
    Storage { path: PathBuf, message: String },

    /// The delivery facility rejected the request
    #[error("Notification facility rejected request: {0}")]
    Rejected(String),
}

/// Errors returned to user-initiated scheduling actions.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// No preferences saved, or the API key / model id is empty
    #[error("Please configure your AI API key and model in settings first.")]
    ConfigurationMissing,

    /// Nothing left to do, so there is nothing to nudge about
    #[error("Add some todos first to get a meaningful motivation message.")]
    NoPendingTasks,

    /// The backend answered but produced no text
    #[error("Failed to generate motivation message.")]
    EmptyMessage,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid wall-clock time
    #[error("Invalid time '{0}': expected HH:MM (24h)")]
    InvalidTime(String),

    /// Empty value where text is required
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Unknown enum literal
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
