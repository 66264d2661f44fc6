//! Context ("next action") service.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Context, UserId};
use crate::domain::ports::ContextRepository;

pub struct ContextService<C: ContextRepository> {
    repository: Arc<C>,
}

impl<C: ContextRepository> ContextService<C> {
    pub fn new(repository: Arc<C>) -> Self {
        Self { repository }
    }

    pub async fn create_context(&self, owner: UserId, name: &str) -> DomainResult<Context> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationFailed(
                "Next action name cannot be empty".to_string(),
            ));
        }

        let context = Context::new(owner, name);
        self.repository.create(&context).await?;

        tracing::info!(user_id = %owner, context_id = %context.id, name = %context.name, "next action created");
        Ok(context)
    }

    pub async fn get_context(&self, owner: UserId, id: Uuid) -> DomainResult<Context> {
        self.repository
            .get(owner, id)
            .await?
            .ok_or(DomainError::ContextNotFound(id))
    }

    pub async fn list_contexts(&self, owner: UserId) -> DomainResult<Vec<Context>> {
        self.repository.list_for_user(owner).await
    }

    pub async fn rename_context(&self, owner: UserId, id: Uuid, name: &str) -> DomainResult<Context> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationFailed(
                "Next action name cannot be empty".to_string(),
            ));
        }

        let mut context = self.get_context(owner, id).await?;
        context.name = name.to_string();
        context.updated_at = chrono::Utc::now();
        self.repository.update(&context).await?;
        Ok(context)
    }
}
