//! Project repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Project, UserId};

/// Repository interface for Project persistence.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Create a new project.
    async fn create(&self, project: &Project) -> DomainResult<()>;

    /// Get a project owned by `user_id`.
    async fn get(&self, user_id: UserId, id: Uuid) -> DomainResult<Option<Project>>;

    /// All of a user's projects in store order.
    async fn list_for_user(&self, user_id: UserId) -> DomainResult<Vec<Project>>;

    /// Persist name and description changes.
    async fn update(&self, project: &Project) -> DomainResult<()>;

    /// Add `delta` to the cached task counter.
    ///
    /// Fails with `ProjectNotFound` when no row was changed.
    async fn adjust_task_count(&self, id: Uuid, delta: i64) -> DomainResult<()>;
}
