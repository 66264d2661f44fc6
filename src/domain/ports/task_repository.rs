//! Task repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Task, UserId};

/// Which tasks a filter keeps by completion state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionFilter {
    #[default]
    Any,
    OpenOnly,
    CompletedOnly,
}

/// Structural filter applied by the store. Always scoped to one owner;
/// trashed tasks are excluded unless asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub user_id: UserId,
    pub project_id: Option<Uuid>,
    pub context_id: Option<Uuid>,
    pub completion: CompletionFilter,
    pub include_trashed: bool,
}

impl TaskFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            project_id: None,
            context_id: None,
            completion: CompletionFilter::Any,
            include_trashed: false,
        }
    }

    pub fn project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn context(mut self, context_id: Uuid) -> Self {
        self.context_id = Some(context_id);
        self
    }

    pub fn open_only(mut self) -> Self {
        self.completion = CompletionFilter::OpenOnly;
        self
    }

    pub fn completed_only(mut self) -> Self {
        self.completion = CompletionFilter::CompletedOnly;
        self
    }

    pub fn with_trashed(mut self) -> Self {
        self.include_trashed = true;
        self
    }
}

/// Repository interface for Task persistence.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create a new task.
    async fn create(&self, task: &Task) -> DomainResult<()>;

    /// Get a task owned by `user_id`. Foreign tasks read as missing.
    async fn get(&self, user_id: UserId, id: Uuid) -> DomainResult<Option<Task>>;

    /// Update an existing task.
    async fn update(&self, task: &Task) -> DomainResult<()>;

    /// List tasks in store order (creation time, then insertion order).
    async fn list(&self, filter: TaskFilter) -> DomainResult<Vec<Task>>;

    /// Count tasks matching the filter.
    async fn count(&self, filter: TaskFilter) -> DomainResult<u64>;

    /// Mark every matching task completed. Returns the number changed.
    async fn complete_matching(&self, filter: TaskFilter) -> DomainResult<u64>;
}
