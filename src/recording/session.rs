// src/recording/session.rs
//! Recording sessions and workflows
//!
//! A `RecordingSession` is the sink for one recording; finishing it yields
//! the `Workflow` handed to storage and downstream tooling.

use crate::recording::emitter::{RecordingSink, SinkError};
use crate::recording::event::{now_millis, InteractionEvent};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;
use ulid::Ulid;

/// Named, ordered sequence of captured events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,

    /// Milliseconds since the Unix epoch
    pub created_at: i64,

    pub events: Vec<InteractionEvent>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, events: Vec<InteractionEvent>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            created_at: now_millis(),
            events,
        }
    }

    pub fn summary(&self) -> WorkflowSummary {
        WorkflowSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            event_count: self.events.len(),
        }
    }
}

/// Listing entry for a stored workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub event_count: usize,
}

/// Request body accepted by the workflow optimization endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRequest {
    pub workflow_id: String,
    pub workflow_name: String,
    pub events: Vec<InteractionEvent>,
}

impl From<&Workflow> for OptimizationRequest {
    fn from(workflow: &Workflow) -> Self {
        Self {
            workflow_id: workflow.id.clone(),
            workflow_name: workflow.name.clone(),
            events: workflow.events.clone(),
        }
    }
}

/// Collects the events of one recording
#[derive(Default)]
pub struct RecordingSession {
    events: Mutex<Vec<InteractionEvent>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Copy of the events collected so far
    pub fn snapshot(&self) -> Vec<InteractionEvent> {
        self.events.lock().clone()
    }

    /// Take the collected events as a workflow, leaving the session empty
    pub fn finish(&self, name: impl Into<String>) -> Workflow {
        let events = std::mem::take(&mut *self.events.lock());
        let workflow = Workflow::new(name, events);
        info!(
            "Finished recording \"{}\" with {} events",
            workflow.name,
            workflow.events.len()
        );
        workflow
    }
}

impl RecordingSink for RecordingSession {
    fn send(&self, event: InteractionEvent) -> Result<(), SinkError> {
        self.events.lock().push(event);
        Ok(())
    }
}
