//! Fuzzy task lookup by title within a structural scope.

use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::Task;
use crate::domain::ports::{TaskFilter, TaskRepository};
use crate::services::similarity::ratio;

/// A candidate task and its title score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTask {
    pub task: Task,
    pub score: u8,
}

pub struct TaskSearch<T: TaskRepository> {
    task_repo: Arc<T>,
}

impl<T: TaskRepository> TaskSearch<T> {
    pub fn new(task_repo: Arc<T>) -> Self {
        Self { task_repo }
    }

    /// Tasks in `scope` whose title scores at least `threshold` against
    /// `query`, best first. Equal scores keep store order.
    ///
    /// Trashed tasks are never candidates, whatever the scope says.
    pub async fn find_relevant(&self, mut scope: TaskFilter, query: &str, threshold: u8) -> DomainResult<Vec<ScoredTask>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        scope.include_trashed = false;
        let user_id = scope.user_id;

        let mut matches: Vec<ScoredTask> = self
            .task_repo
            .list(scope)
            .await?
            .into_iter()
            .filter_map(|task| {
                let score = ratio(query, &task.title);
                (score >= threshold).then_some(ScoredTask { task, score })
            })
            .collect();
        // Stable: ties stay in store order.
        matches.sort_by(|a, b| b.score.cmp(&a.score));

        tracing::debug!(user_id = %user_id, query = query, matches = matches.len(), "task search");
        Ok(matches)
    }
}
