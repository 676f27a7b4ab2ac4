// src/utils/mod.rs
//! Common utilities shared by the capture pipeline and the CLI

pub mod config;
pub mod errors;

pub use config::{LoggingConfig, RecorderSettings};
pub use errors::{RecorderError, Result};
