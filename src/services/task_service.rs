//! Task service implementing business logic.
//!
//! Every mutation that changes a live task's links runs the matching
//! [`CounterUpdater`] hook after the task write.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{derive_category, Priority, Task, TaskLinks, UserId};
use crate::domain::ports::{ContextRepository, ProjectRepository, TaskFilter, TaskRepository};
use crate::services::counter_updater::CounterUpdater;

/// Input for [`TaskService::create_task`]. Links are already resolved ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    /// Requested label; the links decide the stored category.
    pub category: Option<String>,
    pub project_id: Option<Uuid>,
    pub context_id: Option<Uuid>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn links(&self) -> TaskLinks {
        TaskLinks {
            project_id: self.project_id,
            context_id: self.context_id,
        }
    }
}

/// Partial update. `None` leaves a field alone; for the links,
/// `Some(None)` unlinks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub project_id: Option<Option<Uuid>>,
    pub context_id: Option<Option<Uuid>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub struct TaskService<T: TaskRepository, P: ProjectRepository, C: ContextRepository> {
    task_repo: Arc<T>,
    project_repo: Arc<P>,
    context_repo: Arc<C>,
    counters: CounterUpdater<P, C>,
}

impl<T: TaskRepository, P: ProjectRepository, C: ContextRepository> TaskService<T, P, C> {
    pub fn new(task_repo: Arc<T>, project_repo: Arc<P>, context_repo: Arc<C>) -> Self {
        Self {
            counters: CounterUpdater::new(project_repo.clone(), context_repo.clone()),
            task_repo,
            project_repo,
            context_repo,
        }
    }

    /// Create a task for `owner`.
    pub async fn create_task(&self, owner: UserId, new_task: NewTask) -> DomainResult<Task> {
        let links = new_task.links();
        self.check_links(owner, links).await?;

        let mut task = Task::new(owner, new_task.title.trim(), new_task.description)
            .with_links(links)
            .with_priority(new_task.priority);
        task.due_date = new_task.due_date;
        task.category = derive_category(
            links.project_id.is_some(),
            links.context_id.is_some(),
            new_task.category.as_deref(),
        );

        task.validate().map_err(DomainError::ValidationFailed)?;
        self.task_repo.create(&task).await?;
        self.counters.on_created(links).await;

        tracing::info!(user_id = %owner, task_id = %task.id, category = task.category.as_str(), "task created");
        Ok(task)
    }

    /// Get a live task owned by `owner`.
    pub async fn get_task(&self, owner: UserId, id: Uuid) -> DomainResult<Task> {
        match self.task_repo.get(owner, id).await? {
            Some(task) if task.is_live() => Ok(task),
            _ => Err(DomainError::TaskNotFound(id)),
        }
    }

    /// Mark a task completed. Counters are unaffected.
    pub async fn complete_task(&self, owner: UserId, id: Uuid) -> DomainResult<Task> {
        let mut task = self.get_task(owner, id).await?;
        if !task.completed {
            task.completed = true;
            task.touch();
            self.task_repo.update(&task).await?;
            tracing::info!(user_id = %owner, task_id = %id, "task completed");
        }
        Ok(task)
    }

    /// Apply a partial update.
    pub async fn update_task(&self, owner: UserId, id: Uuid, patch: TaskPatch) -> DomainResult<Task> {
        let mut task = self.get_task(owner, id).await?;
        let before = task.links();

        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }

        let after = TaskLinks {
            project_id: patch.project_id.unwrap_or(before.project_id),
            context_id: patch.context_id.unwrap_or(before.context_id),
        };
        if after != before {
            self.check_links(owner, after).await?;
        }
        // Recompute even when unchanged so a stale stored label heals.
        task.set_links(after);

        task.validate().map_err(DomainError::ValidationFailed)?;
        task.touch();
        self.task_repo.update(&task).await?;
        self.counters.on_relinked(before, after).await;

        tracing::info!(user_id = %owner, task_id = %id, relinked = after != before, "task updated");
        Ok(task)
    }

    /// Soft-delete a task. Trashing twice is a miss.
    pub async fn trash_task(&self, owner: UserId, id: Uuid) -> DomainResult<Task> {
        let mut task = self.get_task(owner, id).await?;
        task.trashed = true;
        task.touch();
        self.task_repo.update(&task).await?;
        self.counters.on_trashed(task.links()).await;

        tracing::info!(user_id = %owner, task_id = %id, "task trashed");
        Ok(task)
    }

    pub async fn list_tasks(&self, filter: TaskFilter) -> DomainResult<Vec<Task>> {
        self.task_repo.list(filter).await
    }

    pub async fn count_tasks(&self, filter: TaskFilter) -> DomainResult<u64> {
        self.task_repo.count(filter).await
    }

    /// Complete every open task the filter selects. Returns the exact count.
    pub async fn complete_all(&self, filter: TaskFilter) -> DomainResult<u64> {
        let user_id = filter.user_id;
        let completed = self.task_repo.complete_matching(filter).await?;
        tracing::info!(user_id = %user_id, completed, "bulk completion");
        Ok(completed)
    }

    /// Linked containers must belong to the task owner.
    async fn check_links(&self, owner: UserId, links: TaskLinks) -> DomainResult<()> {
        if let Some(id) = links.project_id {
            self.project_repo
                .get(owner, id)
                .await?
                .ok_or(DomainError::ProjectNotFound(id))?;
        }
        if let Some(id) = links.context_id {
            self.context_repo
                .get(owner, id)
                .await?
                .ok_or(DomainError::ContextNotFound(id))?;
        }
        Ok(())
    }
}
