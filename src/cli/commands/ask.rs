//! Implementation of the `taskpilot ask` command.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

use crate::adapters::completion::OpenAiCompatClient;
use crate::adapters::sqlite::{
    initialize_database, SqliteContextRepository, SqliteProjectRepository, SqliteTaskRepository,
};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{CommandResponse, Config, Outcome, UserId};
use crate::infrastructure::logging::AuditLogger;
use crate::services::CommandOrchestrator;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Caller identity (UUID) that owns the records touched by the command
    #[arg(short, long, env = "TASKPILOT_USER")]
    pub user: String,

    /// The command, in plain language
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct AskOutput(pub CommandResponse);

impl CommandOutput for AskOutput {
    fn to_human(&self) -> String {
        let response = &self.0;
        let mut lines = Vec::new();

        if let Some(message) = &response.message {
            lines.push(message.clone());
        }
        if let Some(summary) = &response.summary {
            lines.push(summary.clone());
        }
        if let Some(progress) = &response.progress {
            if response.message.is_none() {
                lines.push(format!(
                    "{}% complete ({} of {})",
                    progress.percent, progress.completed, progress.total
                ));
            }
        }
        if response.outcome != Outcome::Ambiguous {
            if let Some(task) = &response.task {
                lines.push(format!("  task: {} [{}]", task.title, task.category.as_str()));
            }
            if let Some(project) = &response.project {
                lines.push(format!("  project: {} ({} tasks)", project.name, project.task_count));
            }
            if let Some(context) = &response.next_action {
                lines.push(format!("  next action: {} ({} tasks)", context.name, context.task_count));
            }
        }
        for task in response.tasks.iter().flatten() {
            let mark = if task.completed { "x" } else { " " };
            lines.push(format!("  [{mark}] {}", task.title));
        }
        for project in response.projects.iter().flatten() {
            lines.push(format!("  {} ({} tasks)", project.name, project.task_count));
        }
        for context in response.next_actions.iter().flatten() {
            lines.push(format!("  {} ({} tasks)", context.name, context.task_count));
        }
        if lines.is_empty() {
            lines.push("Done.".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or_default()
    }
}

pub async fn execute(args: AskArgs, config: &Config, json_mode: bool) -> Result<()> {
    let user = UserId::parse(&args.user)?;
    let prompt = args.prompt.join(" ");

    let pool = initialize_database(&config.database)
        .await
        .context("Failed to open database")?;

    let audit = match config.logging.audit_log_path.as_deref() {
        Some(path) => Some(AuditLogger::new(path).await?),
        None => None,
    };

    let mut client = OpenAiCompatClient::new(config.completion.clone())?;
    if let Some(audit) = &audit {
        client = client.with_audit(audit.clone());
    }

    let mut orchestrator = CommandOrchestrator::new(
        Arc::new(SqliteTaskRepository::new(pool.clone())),
        Arc::new(SqliteProjectRepository::new(pool.clone())),
        Arc::new(SqliteContextRepository::new(pool.clone())),
        Arc::new(client),
        config.orchestrator.clone(),
    );
    if let Some(audit) = audit {
        orchestrator = orchestrator.with_audit(audit);
    }

    let result = orchestrator.handle_with_configured_deadline(user, &prompt).await;
    pool.close().await;

    output(&AskOutput(result?), json_mode);
    Ok(())
}
