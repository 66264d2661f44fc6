//! Audit logging for completion exchanges and mutating commands
//!
//! Provides a JSON-lines audit trail of:
//! - Every prompt sent to the completion service and the reply received
//! - Task, project and next-action creation, completion and updates
//!
//! Free text is passed through [`SecretScrubber`] before it is written.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::secret_scrubbing::SecretScrubber;

/// Audit logger for completion exchanges and store mutations
#[derive(Clone)]
pub struct AuditLogger {
    log_file: Arc<Mutex<File>>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger").finish_non_exhaustive()
    }
}

/// Audit event types for categorizing operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    CompletionExchange,
    TaskCreated,
    TaskCompleted,
    TaskUpdated,
    TaskTrashed,
    ProjectCreated,
    ProjectUpdated,
    ContextCreated,
    ContextUpdated,
    CommandHandled,
}

/// Outcome of an audited operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure,
    PartialSuccess,
}

/// Complete audit event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    pub operation: String,
    pub actor: String,
    pub resource_id: Option<String>,
    pub outcome: AuditOutcome,
    pub metadata: Option<Value>,
}

impl AuditLogger {
    /// Create a new audit logger writing to the specified file
    ///
    /// Creates parent directories if they don't exist and appends to any
    /// existing trail.
    pub async fn new(log_path: impl AsRef<Path>) -> Result<Self> {
        let log_path = log_path.as_ref();

        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("failed to create audit log directory")?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .context("failed to open audit log file")?;

        Ok(Self {
            log_file: Arc::new(Mutex::new(file)),
        })
    }

    /// Log an audit event
    ///
    /// Writes the event as a JSON line and mirrors it as a tracing event.
    pub async fn log_event(&self, event: AuditEvent) -> Result<()> {
        let json = serde_json::to_string(&event).context("failed to serialize audit event")?;

        {
            let mut file = self
                .log_file
                .lock()
                .map_err(|e| anyhow::anyhow!("audit log mutex poisoned: {}", e))?;

            writeln!(file, "{}", json).context("failed to write audit event")?;
            file.flush().context("failed to flush audit log")?;
        }

        info!(
            event_type = ?event.event_type,
            operation = %event.operation,
            actor = %event.actor,
            resource_id = ?event.resource_id,
            outcome = ?event.outcome,
            "audit event"
        );

        Ok(())
    }

    /// Record one exchange with the completion service.
    ///
    /// Both sides are scrubbed. System prompts are static templates and are
    /// not recorded.
    pub async fn log_completion(&self, model: &str, user_prompt: &str, reply: &str) -> Result<()> {
        let scrubber = SecretScrubber::global();
        self.log_event(AuditEvent {
            timestamp: Utc::now(),
            event_type: AuditEventType::CompletionExchange,
            operation: "completion".to_string(),
            actor: "completion_client".to_string(),
            resource_id: None,
            outcome: AuditOutcome::Success,
            metadata: Some(serde_json::json!({
                "model": model,
                "prompt": scrubber.scrub_message(user_prompt),
                "reply": scrubber.scrub_message(reply),
            })),
        })
        .await
    }

    /// Convenience method for logging an operation
    ///
    /// # Arguments
    /// * `operation` - Name of the operation (e.g., "create_task", "complete_project_tasks")
    /// * `actor` - User performing the operation
    /// * `resource_id` - Optional identifier of the affected record
    /// * `outcome` - Result of the operation
    /// * `metadata` - Optional additional context as JSON
    pub async fn log_operation(
        &self,
        operation: &str,
        actor: &str,
        resource_id: Option<&str>,
        outcome: AuditOutcome,
        metadata: Option<Value>,
    ) -> Result<()> {
        let event = AuditEvent {
            timestamp: Utc::now(),
            event_type: infer_event_type(operation),
            operation: operation.to_string(),
            actor: actor.to_string(),
            resource_id: resource_id.map(String::from),
            outcome,
            metadata,
        };

        self.log_event(event).await
    }
}

/// Infer event type from operation name
fn infer_event_type(operation: &str) -> AuditEventType {
    let op = operation.to_lowercase();
    let subject_is = |name: &str| op.contains(name);

    if subject_is("task") && op.contains("create") {
        AuditEventType::TaskCreated
    } else if subject_is("task") && op.contains("complete") {
        AuditEventType::TaskCompleted
    } else if subject_is("task") && op.contains("trash") {
        AuditEventType::TaskTrashed
    } else if subject_is("task") && op.contains("update") {
        AuditEventType::TaskUpdated
    } else if subject_is("project") && op.contains("create") {
        AuditEventType::ProjectCreated
    } else if subject_is("project") {
        AuditEventType::ProjectUpdated
    } else if subject_is("context") && op.contains("create") {
        AuditEventType::ContextCreated
    } else if subject_is("context") {
        AuditEventType::ContextUpdated
    } else {
        debug!(operation = %operation, "audit operation has no specific event type");
        AuditEventType::CommandHandled
    }
}
