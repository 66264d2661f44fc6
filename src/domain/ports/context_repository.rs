//! Context ("next action") repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Context, UserId};

#[async_trait]
pub trait ContextRepository: Send + Sync {
    async fn create(&self, context: &Context) -> DomainResult<()>;

    async fn get(&self, user_id: UserId, id: Uuid) -> DomainResult<Option<Context>>;

    /// All of a user's contexts in store order.
    async fn list_for_user(&self, user_id: UserId) -> DomainResult<Vec<Context>>;

    async fn update(&self, context: &Context) -> DomainResult<()>;

    /// Fails with `ContextNotFound` when no row was changed.
    async fn adjust_task_count(&self, id: Uuid, delta: i64) -> DomainResult<()>;
}
