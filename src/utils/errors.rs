// src/utils/errors.rs
//! Error types for the recorder
//!
//! The capture path itself never surfaces errors to the page; these cover
//! configuration, persistence, export and scenario handling.

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, RecorderError>;

/// Recorder errors
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage failed: {0}")]
    StorageFailed(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Scenario failed: {0}")]
    ScenarioFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<config::ConfigError> for RecorderError {
    fn from(e: config::ConfigError) -> Self {
        RecorderError::ConfigError(e.to_string())
    }
}

impl From<rusqlite::Error> for RecorderError {
    fn from(e: rusqlite::Error) -> Self {
        RecorderError::StorageFailed(e.to_string())
    }
}
