// src/recording/emitter.rs
//! Fire-and-forget delivery to the recording sink
//!
//! The emitter hands each event to the sink exactly once. A refused event is
//! logged and dropped; nothing is buffered, retried or raised to the page,
//! and the next event is attempted normally, so recording resumes as soon as
//! the sink accepts again.

use crate::observability::{EVENTS_DROPPED, EVENTS_EMITTED};
use crate::recording::event::InteractionEvent;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Why a sink refused an event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// Receiving context is gone (e.g. the host extension was reloaded)
    #[error("recording channel disconnected")]
    Disconnected,

    #[error("recording sink is full")]
    Full,

    #[error("sink rejected event: {0}")]
    Rejected(String),
}

impl SinkError {
    /// Metric label
    pub fn reason(&self) -> &'static str {
        match self {
            SinkError::Disconnected => "disconnected",
            SinkError::Full => "full",
            SinkError::Rejected(_) => "rejected",
        }
    }
}

/// Destination of finished events
///
/// `send` must not block; the capture path calls it inline.
pub trait RecordingSink: Send + Sync {
    fn send(&self, event: InteractionEvent) -> Result<(), SinkError>;
}

/// Delivers events to a sink, absorbing failures
pub struct EventEmitter {
    sink: Arc<dyn RecordingSink>,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl EventEmitter {
    pub fn new(sink: Arc<dyn RecordingSink>) -> Self {
        Self {
            sink,
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Hand an event to the sink; returns whether it was accepted
    pub fn emit(&self, event: InteractionEvent) -> bool {
        let kind = event.kind;
        let id = event.id.clone();

        match self.sink.send(event) {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(EVENTS_EMITTED, "kind" => kind.as_str()).increment(1);
                debug!("Emitted {} event {}", kind.as_str(), id);
                true
            }
            Err(e) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                metrics::counter!(EVENTS_DROPPED, "reason" => e.reason()).increment(1);
                warn!("Dropping {} event {}: {}", kind.as_str(), id, e);
                false
            }
        }
    }

    pub fn stats(&self) -> EmitterStats {
        EmitterStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Emitter statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStats {
    pub delivered: u64,
    pub dropped: u64,
}

/// Sink over a tokio channel that can be torn down and restored
///
/// Models the extension runtime channel: while disconnected every send
/// fails with `SinkError::Disconnected`.
pub struct ChannelSink {
    sender: RwLock<Option<mpsc::UnboundedSender<InteractionEvent>>>,
}

impl ChannelSink {
    /// Create a connected sink and its receiving end
    pub fn new() -> (Self, mpsc::UnboundedReceiver<InteractionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                sender: RwLock::new(Some(tx)),
            },
            rx,
        )
    }

    /// Drop the sending half
    pub fn disconnect(&self) {
        self.sender.write().take();
    }

    /// Install a fresh channel, returning its receiving end
    pub fn reconnect(&self) -> mpsc::UnboundedReceiver<InteractionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.write() = Some(tx);
        rx
    }

    pub fn is_connected(&self) -> bool {
        self.sender
            .read()
            .as_ref()
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }
}

impl RecordingSink for ChannelSink {
    fn send(&self, event: InteractionEvent) -> Result<(), SinkError> {
        match self.sender.read().as_ref() {
            Some(tx) => tx.send(event).map_err(|_| SinkError::Disconnected),
            None => Err(SinkError::Disconnected),
        }
    }
}
