//! Unified orchestrator response.

use serde::Serialize;

use super::project::{Context, Project};
use super::task::Task;

/// How a command ended. Misses and ambiguity are outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Done,
    NotFound,
    Ambiguous,
    Unknown,
}

/// Completion progress of a task, project or context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: i64,
    pub total: i64,
    pub percent: i64,
}

impl Progress {
    /// Integer percentage, rounded half up. Zero when there is nothing to do.
    pub fn new(completed: i64, total: i64) -> Self {
        let percent = if total <= 0 {
            0
        } else {
            (completed * 200 + total) / (total * 2)
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}

/// Everything a command can report back. Unset fields are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub intent: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<Context>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_actions: Option<Vec<Context>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
}

impl CommandResponse {
    pub fn new(intent: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            intent: intent.into(),
            outcome,
            message: None,
            task: None,
            project: None,
            next_action: None,
            tasks: None,
            projects: None,
            next_actions: None,
            summary: None,
            count: None,
            failed_count: None,
            progress: None,
        }
    }

    pub fn done(intent: impl Into<String>) -> Self {
        Self::new(intent, Outcome::Done)
    }

    pub fn not_found(intent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(intent, Outcome::NotFound).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.task = Some(task);
        self
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.project = Some(project);
        self
    }

    pub fn with_next_action(mut self, context: Context) -> Self {
        self.next_action = Some(context);
        self
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = Some(projects);
        self
    }

    pub fn with_next_actions(mut self, contexts: Vec<Context>) -> Self {
        self.next_actions = Some(contexts);
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_failed_count(mut self, failed: u64) -> Self {
        self.failed_count = Some(failed);
        self
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(Progress::new(0, 0).percent, 0);
        assert_eq!(Progress::new(1, 3).percent, 33);
        assert_eq!(Progress::new(2, 3).percent, 67);
        assert_eq!(Progress::new(4, 4).percent, 100);
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let response = CommandResponse::not_found("completeTask", "No matching task found");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["intent"], "completeTask");
        assert_eq!(value["outcome"], "notFound");
        assert!(value.get("task").is_none());
        assert!(value.get("failedCount").is_none());
    }

    #[test]
    fn test_counts_serialize_camel_case() {
        let response = CommandResponse::done("createProject")
            .with_count(2)
            .with_failed_count(1)
            .with_progress(Progress::new(1, 2));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["failedCount"], 1);
        assert_eq!(value["progress"]["percent"], 50);
    }
}
