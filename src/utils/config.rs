// src/utils/config.rs
//! Layered recorder configuration
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Optional config file (`recorder.toml` / `.yaml` / `.json`, or an explicit path)
//! 3. Environment variables prefixed with `RECORDER__` (e.g. `RECORDER__CAPTURE__INPUT_DEBOUNCE_MS=800`)

use crate::capture::CaptureConfig;
use crate::recording::storage::StorageConfig;
use crate::utils::errors::{RecorderError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default config file stem looked up in the working directory
const DEFAULT_CONFIG_NAME: &str = "recorder";

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderSettings {
    /// Capture pipeline tuning
    pub capture: CaptureConfig,

    /// Workflow store location
    pub storage: StorageConfig,

    /// Log output
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl RecorderSettings {
    /// Load settings from the default file name and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings, optionally from an explicit file
    ///
    /// An explicit file must exist; the default one is optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings: RecorderSettings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("RECORDER").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!("Recorder settings loaded: {:?}", settings);

        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        self.capture.validate().map_err(RecorderError::ConfigError)?;

        if self.storage.db_name.trim().is_empty() {
            return Err(RecorderError::ConfigError(
                "storage.db_name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
