// src/lib.rs
//! Workflow Recorder Library
//!
//! Captures user interactions from a web page, derives stable element
//! locators for them, filters noise, and hands each structured record to a
//! recording sink.
//!
//! # Architecture
//!
//! The recorder is structured into several key modules:
//!
//! - **dom**: Element view abstraction and an in-memory page model
//! - **selector**: CSS selector, XPath and semantic role synthesis
//! - **capture**: Page listeners, noise filters, debouncing, event building
//! - **recording**: Event records, emitter, sinks, workflow storage and export
//! - **scenario**: YAML-scripted page sessions
//! - **observability**: Metrics, tracing, and logging
//! - **utils**: Configuration and errors

// Public module exports
pub mod capture;
pub mod dom;
pub mod observability;
pub mod recording;
pub mod scenario;
pub mod selector;
pub mod utils;

// Re-export commonly used types
pub use capture::{CaptureConfig, Recorder, Subscription};
pub use dom::{ElementView, Page};
pub use recording::{EventKind, InteractionEvent, RecordingSink, Workflow};
pub use selector::{synthesize, Locator};
pub use utils::config::RecorderSettings;
pub use utils::errors::{RecorderError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
