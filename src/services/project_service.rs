//! Project service.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Project, UserId};
use crate::domain::ports::ProjectRepository;

pub struct ProjectService<P: ProjectRepository> {
    repository: Arc<P>,
}

impl<P: ProjectRepository> ProjectService<P> {
    pub fn new(repository: Arc<P>) -> Self {
        Self { repository }
    }

    /// Create an empty project.
    pub async fn create_project(
        &self,
        owner: UserId,
        name: &str,
        description: Option<String>,
    ) -> DomainResult<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationFailed(
                "Project name cannot be empty".to_string(),
            ));
        }

        let project = Project::new(owner, name, description);
        self.repository.create(&project).await?;

        tracing::info!(user_id = %owner, project_id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    pub async fn get_project(&self, owner: UserId, id: Uuid) -> DomainResult<Project> {
        self.repository
            .get(owner, id)
            .await?
            .ok_or(DomainError::ProjectNotFound(id))
    }

    /// All projects in store order.
    pub async fn list_projects(&self, owner: UserId) -> DomainResult<Vec<Project>> {
        self.repository.list_for_user(owner).await
    }

    pub async fn rename_project(&self, owner: UserId, id: Uuid, name: &str) -> DomainResult<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationFailed(
                "Project name cannot be empty".to_string(),
            ));
        }

        let mut project = self.get_project(owner, id).await?;
        project.name = name.to_string();
        project.updated_at = chrono::Utc::now();
        self.repository.update(&project).await?;
        Ok(project)
    }

    /// Replace the description; a blank one clears it.
    pub async fn describe_project(
        &self,
        owner: UserId,
        id: Uuid,
        description: &str,
    ) -> DomainResult<Project> {
        let mut project = self.get_project(owner, id).await?;
        project.description = Some(description.trim().to_string()).filter(|d| !d.is_empty());
        project.updated_at = chrono::Utc::now();
        self.repository.update(&project).await?;
        Ok(project)
    }
}
