// src/capture/mod.rs
//! Interaction capture
//!
//! Turns raw page events into `InteractionEvent`s:
//!
//! - **Filter**: early rejection of noise (non-actionable clicks, Enter outside text fields)
//! - **Debounce**: collapses input and scroll bursts into one event
//! - **Builder**: assembles the normalized record
//! - **Recorder**: attaches listeners to a page and drives the pipeline
//!
//! # Architecture
//!
//! ```text
//! DomEvent → filter → (debounce) → EventBuilder → EventEmitter → RecordingSink
//! ```
//!
//! The pipeline is one-way; nothing flows back to the page.

pub mod builder;
pub mod debounce;
pub mod filter;
pub mod recorder;

// Re-export commonly used types
pub use builder::EventBuilder;
pub use debounce::Debouncer;
pub use filter::{is_actionable, is_enter_target, is_form_control};
pub use recorder::{Recorder, Subscription};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Capture tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Quiet period before an input burst is emitted (milliseconds)
    pub input_debounce_ms: u64,

    /// Quiet period before a scroll burst is evaluated (milliseconds)
    pub scroll_debounce_ms: u64,

    /// Minimum vertical distance from the last emitted scroll (pixels)
    pub scroll_threshold_px: f64,

    /// Record field values; when off only the length is kept
    pub capture_input_values: bool,

    /// Characters of a field value kept in the payload
    pub max_value_chars: usize,

    /// Characters of element text kept in click payloads
    pub max_click_text_chars: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input_debounce_ms: 500,
            scroll_debounce_ms: 400,
            scroll_threshold_px: 300.0,
            capture_input_values: true,
            max_value_chars: 200,
            max_click_text_chars: 80,
        }
    }
}

impl CaptureConfig {
    pub fn input_debounce(&self) -> Duration {
        Duration::from_millis(self.input_debounce_ms)
    }

    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.input_debounce_ms == 0 {
            return Err("capture.input_debounce_ms must be greater than 0".to_string());
        }

        if self.scroll_debounce_ms == 0 {
            return Err("capture.scroll_debounce_ms must be greater than 0".to_string());
        }

        if !self.scroll_threshold_px.is_finite() || self.scroll_threshold_px < 0.0 {
            return Err(format!(
                "capture.scroll_threshold_px must be a non-negative number, got {}",
                self.scroll_threshold_px
            ));
        }

        if self.max_value_chars == 0 || self.max_click_text_chars == 0 {
            return Err("capture truncation limits must be greater than 0".to_string());
        }

        Ok(())
    }
}
