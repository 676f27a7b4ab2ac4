// src/recording/mod.rs
//! Event records, delivery and persistence
//!
//! This module owns everything after an interaction has been captured:
//!
//! - **Event**: the `InteractionEvent` record and its payload types
//! - **Emitter**: fire-and-forget delivery to a `RecordingSink`
//! - **Event Queue**: bounded lock-free sink for polling consumers
//! - **Session**: in-memory sink that finishes into a `Workflow`
//! - **Storage**: SQLite workflow store
//! - **Exporter**: Export to JSON, NDJSON, summary and optimization request
//!
//! # Architecture
//!
//! ```text
//! capture → EventEmitter::emit() → RecordingSink
//!                                    ├─ ChannelSink  (extension channel)
//!                                    ├─ EventQueue   (bounded, lock-free)
//!                                    └─ RecordingSession → Workflow → WorkflowStore
//!                                                                       ↓
//!                                                                    Exporter
//! ```

pub mod emitter;
pub mod event;
pub mod event_queue;
pub mod exporter;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use emitter::{ChannelSink, EmitterStats, EventEmitter, RecordingSink, SinkError};
pub use event::{
    ClickPayload, ElementDescriptor, EventKind, InteractionEvent, NavigationPayload,
    PageContext, PageVisitPayload, ScrollDirection, ScrollPayload, ValuePayload,
};
pub use event_queue::{EventQueue, QueueStats};
pub use exporter::{ExportFormat, Exporter};
pub use session::{OptimizationRequest, RecordingSession, Workflow, WorkflowSummary};
pub use storage::{StorageConfig, StorageStats, WorkflowStore};
