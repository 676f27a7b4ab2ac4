// src/main.rs
//! Workflow Recorder
//!
//! Records scripted page sessions into workflows and manages the local
//! workflow store.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use workflow_recorder::capture::Recorder;
use workflow_recorder::observability::{init_metrics, init_tracing};
use workflow_recorder::recording::{ExportFormat, Exporter, RecordingSession, WorkflowStore};
use workflow_recorder::scenario::Scenario;
use workflow_recorder::utils::config::RecorderSettings;

/// Workflow Recorder CLI.
#[derive(Parser)]
#[command(name = "workflow-recorder")]
#[command(about = "Record browser interactions into replayable workflows")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "RECORDER_CONFIG")]
    config: Option<PathBuf>,

    /// Print Prometheus metrics on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a scenario file into a new workflow
    Record {
        /// Scenario YAML file
        scenario: PathBuf,

        /// Workflow name (defaults to the scenario name)
        #[arg(long)]
        name: Option<String>,
    },

    /// List stored workflows, newest first
    List,

    /// Show a stored workflow
    Show {
        /// Workflow ID
        id: String,

        /// Output format (json, ndjson, summary, optimize-request)
        #[arg(long, default_value = "summary")]
        format: String,
    },

    /// Delete a stored workflow
    Delete {
        /// Workflow ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = RecorderSettings::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    // Initialize observability (tracing, metrics)
    init_tracing(&settings.logging)?;
    let metrics = if cli.metrics {
        Some(init_metrics()?)
    } else {
        None
    };

    info!("Workflow Recorder v{}", workflow_recorder::VERSION);

    let store = WorkflowStore::new(settings.storage.clone()).await?;

    match cli.command {
        Commands::Record { scenario, name } => {
            let scenario = Scenario::from_file(&scenario).await?;

            let session = Arc::new(RecordingSession::new());
            let recorder = Recorder::new(settings.capture.clone(), session.clone());
            scenario.record(&recorder).await?;

            let stats = recorder.stats();
            if stats.dropped > 0 {
                warn!("{} events were dropped during recording", stats.dropped);
            }

            let name = name.unwrap_or_else(|| scenario.display_name());
            let workflow = session.finish(name);
            store.save(&workflow).await?;

            println!(
                "Recorded workflow {} \"{}\" ({} events)",
                workflow.id,
                workflow.name,
                workflow.events.len()
            );
        }

        Commands::List => {
            let workflows = store.list().await?;
            if workflows.is_empty() {
                println!("No workflows recorded yet.");
            }
            for summary in workflows {
                println!(
                    "{}  {:>4} events  {}",
                    summary.id, summary.event_count, summary.name
                );
            }
        }

        Commands::Show { id, format } => {
            let format: ExportFormat = format.parse()?;
            let Some(workflow) = store.get(&id).await? else {
                bail!("Workflow not found: {}", id);
            };
            println!("{}", Exporter::new(format).export(&workflow)?);
        }

        Commands::Delete { id } => {
            if !store.delete(&id).await? {
                bail!("Workflow not found: {}", id);
            }
            println!("Deleted workflow {}", id);
        }
    }

    if let Some(handle) = metrics {
        print!("{}", handle.render());
    }

    Ok(())
}
