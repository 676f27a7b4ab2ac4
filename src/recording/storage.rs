// src/recording/storage.rs
//! Workflow storage using SQLite
//!
//! One row per workflow; events are stored as a JSON array so a workflow is
//! always read back exactly as it was recorded.

use crate::recording::event::InteractionEvent;
use crate::recording::session::{Workflow, WorkflowSummary};
use crate::utils::errors::{RecorderError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for storage
    pub base_dir: PathBuf,

    /// SQLite database file name
    pub db_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(".workflow-recorder"),
            db_name: "workflows.db".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn db_path(&self) -> PathBuf {
        self.base_dir.join(&self.db_name)
    }
}

/// Persistent workflow store
pub struct WorkflowStore {
    config: StorageConfig,
    db: Mutex<Connection>,
}

impl WorkflowStore {
    /// Open (or create) the store
    pub async fn new(config: StorageConfig) -> Result<Self> {
        fs::create_dir_all(&config.base_dir).await.map_err(|e| {
            RecorderError::StorageFailed(format!("Failed to create directory: {}", e))
        })?;

        let conn = Connection::open(config.db_path()).map_err(|e| {
            RecorderError::StorageFailed(format!("Failed to open database: {}", e))
        })?;

        let store = Self {
            config,
            db: Mutex::new(conn),
        };

        store.init_schema().await?;

        info!("Workflow store initialized at {:?}", store.config.db_path());

        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        let db = self.db.lock().await;

        db.execute(
            r#"
            CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                event_count INTEGER NOT NULL,
                events TEXT NOT NULL
            )
            "#,
            [],
        )
        .map_err(|e| RecorderError::StorageFailed(format!("Schema creation failed: {}", e)))?;

        db.execute(
            "CREATE INDEX IF NOT EXISTS idx_workflows_created_at ON workflows(created_at)",
            [],
        )
        .map_err(|e| RecorderError::StorageFailed(format!("Index creation failed: {}", e)))?;

        Ok(())
    }

    /// Insert or replace a workflow
    pub async fn save(&self, workflow: &Workflow) -> Result<()> {
        let events = serde_json::to_string(&workflow.events)?;

        let db = self.db.lock().await;
        db.execute(
            r#"
            INSERT OR REPLACE INTO workflows (id, name, created_at, event_count, events)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                workflow.id,
                workflow.name,
                workflow.created_at,
                workflow.events.len() as i64,
                events,
            ],
        )
        .map_err(|e| RecorderError::StorageFailed(format!("Failed to save workflow: {}", e)))?;

        debug!("Saved workflow {} ({} events)", workflow.id, workflow.events.len());

        Ok(())
    }

    /// Load a workflow by id
    pub async fn get(&self, id: &str) -> Result<Option<Workflow>> {
        let db = self.db.lock().await;

        let row = db
            .query_row(
                "SELECT id, name, created_at, events FROM workflows WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| RecorderError::StorageFailed(format!("Workflow query failed: {}", e)))?;

        drop(db);

        row.map(|(id, name, created_at, events)| {
            let events: Vec<InteractionEvent> = serde_json::from_str(&events)?;
            Ok(Workflow {
                id,
                name,
                created_at,
                events,
            })
        })
        .transpose()
    }

    /// All workflows, newest first
    pub async fn list(&self) -> Result<Vec<WorkflowSummary>> {
        let db = self.db.lock().await;

        let mut stmt = db
            .prepare(
                "SELECT id, name, created_at, event_count FROM workflows ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| {
                RecorderError::StorageFailed(format!("Query preparation failed: {}", e))
            })?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(WorkflowSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                    event_count: row.get::<_, i64>(3)? as usize,
                })
            })
            .map_err(|e| RecorderError::StorageFailed(format!("Query execution failed: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                RecorderError::StorageFailed(format!("Result collection failed: {}", e))
            })?;

        Ok(summaries)
    }

    /// Delete a workflow; returns whether it existed
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let db = self.db.lock().await;
        let removed = db
            .execute("DELETE FROM workflows WHERE id = ?1", params![id])
            .map_err(|e| {
                RecorderError::StorageFailed(format!("Failed to delete workflow: {}", e))
            })?;

        if removed > 0 {
            info!("Deleted workflow {}", id);
        }

        Ok(removed > 0)
    }

    pub async fn stats(&self) -> Result<StorageStats> {
        let db = self.db.lock().await;

        let (total_workflows, total_events): (i64, i64) = db.query_row(
            "SELECT COUNT(*), COALESCE(SUM(event_count), 0) FROM workflows",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StorageStats {
            total_workflows: total_workflows as u64,
            total_events: total_events as u64,
        })
    }
}

/// Storage statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    pub total_workflows: u64,
    pub total_events: u64,
}
