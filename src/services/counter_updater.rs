//! Incremental maintenance of project/context task counters.
//!
//! Counters are never recomputed. Every task mutation that changes which
//! containers a live task belongs to must go through exactly one of these
//! hooks. Counter writes happen after the task write has committed; a failed
//! counter write is logged and the request still succeeds.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::{EntityKind, TaskLinks};
use crate::domain::ports::{ContextRepository, ProjectRepository};

pub struct CounterUpdater<P: ProjectRepository, C: ContextRepository> {
    project_repo: Arc<P>,
    context_repo: Arc<C>,
}

impl<P: ProjectRepository, C: ContextRepository> CounterUpdater<P, C> {
    pub fn new(project_repo: Arc<P>, context_repo: Arc<C>) -> Self {
        Self {
            project_repo,
            context_repo,
        }
    }

    /// A live task was created with `links`.
    pub async fn on_created(&self, links: TaskLinks) {
        if let Some(id) = links.project_id {
            self.adjust(EntityKind::Project, id, 1).await;
        }
        if let Some(id) = links.context_id {
            self.adjust(EntityKind::Context, id, 1).await;
        }
    }

    /// A live task moved from `before` to `after`. Each link kind is only
    /// touched when it actually changed.
    pub async fn on_relinked(&self, before: TaskLinks, after: TaskLinks) {
        if before.project_id != after.project_id {
            if let Some(id) = before.project_id {
                self.adjust(EntityKind::Project, id, -1).await;
            }
            if let Some(id) = after.project_id {
                self.adjust(EntityKind::Project, id, 1).await;
            }
        }
        if before.context_id != after.context_id {
            if let Some(id) = before.context_id {
                self.adjust(EntityKind::Context, id, -1).await;
            }
            if let Some(id) = after.context_id {
                self.adjust(EntityKind::Context, id, 1).await;
            }
        }
    }

    /// A task holding `links` was soft-deleted.
    pub async fn on_trashed(&self, links: TaskLinks) {
        if let Some(id) = links.project_id {
            self.adjust(EntityKind::Project, id, -1).await;
        }
        if let Some(id) = links.context_id {
            self.adjust(EntityKind::Context, id, -1).await;
        }
    }

    async fn adjust(&self, kind: EntityKind, id: Uuid, delta: i64) {
        let result = match kind {
            EntityKind::Project => self.project_repo.adjust_task_count(id, delta).await,
            EntityKind::Context => self.context_repo.adjust_task_count(id, delta).await,
        };
        match result {
            Ok(()) => tracing::debug!(kind = kind.as_str(), id = %id, delta, "task counter adjusted"),
            Err(e) => tracing::warn!(
                kind = kind.as_str(),
                id = %id,
                delta,
                error = %e,
                "task counter update failed; counter may drift"
            ),
        }
    }
}
