// src/recording/exporter.rs
//! Export workflows to various formats
//!
//! Supports:
//! - JSON (the stored workflow, pretty printed)
//! - NDJSON (one event per line, for log tooling)
//! - Summary (numbered plain-text steps for humans)
//! - Optimization request (body accepted by the optimization endpoint)

use crate::recording::event::{
    ClickPayload, EventKind, InteractionEvent, NavigationPayload, PageVisitPayload,
    ScrollDirection, ScrollPayload, ValuePayload,
};
use crate::recording::session::{OptimizationRequest, Workflow};
use crate::utils::errors::{RecorderError, Result};
use std::fmt::Write;
use std::str::FromStr;
use tracing::debug;

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format
    Json,

    /// Newline-delimited JSON events
    Ndjson,

    /// Human-readable step list
    Summary,

    /// `{ workflowId, workflowName, events }`
    OptimizationRequest,
}

impl FromStr for ExportFormat {
    type Err = RecorderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "ndjson" => Ok(ExportFormat::Ndjson),
            "summary" => Ok(ExportFormat::Summary),
            "optimize-request" | "optimization-request" => Ok(ExportFormat::OptimizationRequest),
            other => Err(RecorderError::InvalidArgument(format!(
                "unknown export format: {}",
                other
            ))),
        }
    }
}

/// Exporter for recorded workflows
pub struct Exporter {
    format: ExportFormat,
}

impl Exporter {
    /// Create a new exporter
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// Export a workflow to string
    pub fn export(&self, workflow: &Workflow) -> Result<String> {
        debug!(
            "Exporting workflow {} ({} events) to {:?} format",
            workflow.id,
            workflow.events.len(),
            self.format
        );

        match self.format {
            ExportFormat::Json => self.export_json(workflow),
            ExportFormat::Ndjson => self.export_ndjson(workflow),
            ExportFormat::Summary => Ok(self.export_summary(workflow)),
            ExportFormat::OptimizationRequest => self.export_optimization_request(workflow),
        }
    }

    fn export_json(&self, workflow: &Workflow) -> Result<String> {
        serde_json::to_string_pretty(workflow)
            .map_err(|e| RecorderError::ExportFailed(format!("JSON serialization error: {}", e)))
    }

    fn export_ndjson(&self, workflow: &Workflow) -> Result<String> {
        let mut out = String::new();
        for event in &workflow.events {
            let line = serde_json::to_string(event).map_err(|e| {
                RecorderError::ExportFailed(format!("NDJSON serialization error: {}", e))
            })?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    fn export_summary(&self, workflow: &Workflow) -> String {
        let mut out = format!(
            "{} ({} events, recorded {})\n",
            workflow.name,
            workflow.events.len(),
            format_timestamp(workflow.created_at)
        );

        for (index, event) in workflow.events.iter().enumerate() {
            // Writing to a String cannot fail
            let _ = writeln!(
                out,
                "{:>3}. {} {:<14} {}",
                index + 1,
                format_timestamp(event.timestamp),
                event.kind.as_str(),
                describe(event)
            );
        }

        out
    }

    fn export_optimization_request(&self, workflow: &Workflow) -> Result<String> {
        if workflow.events.is_empty() {
            return Err(RecorderError::ExportFailed(format!(
                "workflow {} has no events to optimize",
                workflow.id
            )));
        }

        serde_json::to_string_pretty(&OptimizationRequest::from(workflow)).map_err(|e| {
            RecorderError::ExportFailed(format!("Request serialization error: {}", e))
        })
    }
}

/// One-line description of an event for the summary
fn describe(event: &InteractionEvent) -> String {
    let target = event
        .target
        .as_ref()
        .map(|t| t.best_locator().to_string())
        .unwrap_or_default();

    match event.kind {
        EventKind::Click => match event.payload_as::<ClickPayload>().ok().and_then(|p| p.text) {
            Some(text) => format!("{} \"{}\"", target, text),
            None => target,
        },
        EventKind::Input | EventKind::KeypressEnter => match event.payload_as::<ValuePayload>() {
            Ok(ValuePayload {
                value: Some(value), ..
            }) => format!("{} = \"{}\"", target, value),
            Ok(ValuePayload { length, .. }) => format!("{} ({} chars)", target, length),
            Err(_) => target,
        },
        EventKind::Scroll => match event.payload_as::<ScrollPayload>() {
            Ok(p) => {
                let direction = match p.direction {
                    ScrollDirection::Down => "down",
                    ScrollDirection::Up => "up",
                };
                format!("y={} ({})", p.y, direction)
            }
            Err(_) => String::new(),
        },
        EventKind::Navigation => match event.payload_as::<NavigationPayload>() {
            Ok(p) => format!("{} -> {}", p.from, p.url),
            Err(_) => event.page_context.url.clone(),
        },
        EventKind::PageVisit => match event.payload_as::<PageVisitPayload>().ok().and_then(|p| p.referrer) {
            Some(referrer) => format!("{} (from {})", event.page_context.url, referrer),
            None => event.page_context.url.clone(),
        },
    }
}

fn format_timestamp(timestamp_ms: i64) -> String {
    use chrono::{DateTime, SecondsFormat, Utc};
    let dt = DateTime::<Utc>::from_timestamp_millis(timestamp_ms).unwrap_or_default();
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::event::{ElementDescriptor, PageContext};
    use crate::selector::SemanticRole;

    fn create_test_event(kind: EventKind, payload: serde_json::Value) -> InteractionEvent {
        let target = (!kind.is_page_level()).then(|| ElementDescriptor {
            tag_name: "BUTTON".to_string(),
            selector: Some("#submit-btn".to_string()),
            xpath: "/html[1]/body[1]/button[1]".to_string(),
            input_type: None,
            semantic_role: SemanticRole::SubmitButton,
        });

        InteractionEvent {
            id: format!("evt_{}", kind.as_str()),
            kind,
            timestamp: 1_700_000_000_000,
            page_context: PageContext {
                url: "https://shop.example/cart".to_string(),
                title: "Cart".to_string(),
            },
            target,
            payload,
        }
    }

    fn create_test_workflow() -> Workflow {
        Workflow {
            id: "wf_1".to_string(),
            name: "Checkout".to_string(),
            created_at: 1_700_000_000_000,
            events: vec![
                create_test_event(EventKind::PageVisit, serde_json::json!({ "referrer": null })),
                create_test_event(EventKind::Click, serde_json::json!({ "text": "Submit" })),
                create_test_event(EventKind::Scroll, serde_json::json!({ "y": 400, "direction": "down" })),
            ],
        }
    }

    #[test]
    fn test_json_export() {
        let exporter = Exporter::new(ExportFormat::Json);
        let json = exporter.export(&create_test_workflow()).unwrap();

        let parsed: Workflow = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, create_test_workflow());
    }

    #[test]
    fn test_ndjson_export() {
        let exporter = Exporter::new(ExportFormat::Ndjson);
        let out = exporter.export(&create_test_workflow()).unwrap();

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        let second: InteractionEvent = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.kind, EventKind::Click);
    }

    #[test]
    fn test_summary_export() {
        let exporter = Exporter::new(ExportFormat::Summary);
        let out = exporter.export(&create_test_workflow()).unwrap();

        assert!(out.starts_with("Checkout (3 events, recorded 2023-11-14T22:13:20.000Z)"));
        assert!(out.contains("click"));
        assert!(out.contains("#submit-btn \"Submit\""));
        assert!(out.contains("y=400 (down)"));
        assert!(out.contains("https://shop.example/cart"));
    }

    #[test]
    fn test_optimization_request_export() {
        let exporter = Exporter::new(ExportFormat::OptimizationRequest);
        let out = exporter.export(&create_test_workflow()).unwrap();

        let body: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(body["workflowId"], "wf_1");
        assert_eq!(body["workflowName"], "Checkout");
        assert_eq!(body["events"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_empty_workflow_not_optimizable() {
        let exporter = Exporter::new(ExportFormat::OptimizationRequest);
        let empty = Workflow {
            events: vec![],
            ..create_test_workflow()
        };

        assert!(matches!(
            exporter.export(&empty),
            Err(RecorderError::ExportFailed(_))
        ));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(
            "optimize-request".parse::<ExportFormat>().unwrap(),
            ExportFormat::OptimizationRequest
        );
        assert!("har".parse::<ExportFormat>().is_err());
    }
}
