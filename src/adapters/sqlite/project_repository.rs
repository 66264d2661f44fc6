//! SQLite implementation of the ProjectRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Project, UserId};
use crate::domain::ports::ProjectRepository;

use super::{format_datetime, parse_datetime, parse_uuid};

#[derive(Clone)]
pub struct SqliteProjectRepository {
    pool: SqlitePool,
}

impl SqliteProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectRepository {
    async fn create(&self, project: &Project) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO projects (id, user_id, name, description, task_count, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(project.id.to_string())
        .bind(project.user_id.to_string())
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.task_count)
        .bind(format_datetime(project.created_at))
        .bind(format_datetime(project.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, user_id: UserId, id: Uuid) -> DomainResult<Option<Project>> {
        let row: Option<ProjectRow> = sqlx::query_as(
            "SELECT id, user_id, name, description, task_count, created_at, updated_at
             FROM projects WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Project::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> DomainResult<Vec<Project>> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            "SELECT id, user_id, name, description, task_count, created_at, updated_at
             FROM projects WHERE user_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Project::try_from).collect()
    }

    async fn update(&self, project: &Project) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE projects SET name = ?, description = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(format_datetime(project.updated_at))
        .bind(project.id.to_string())
        .bind(project.user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ProjectNotFound(project.id));
        }

        Ok(())
    }

    async fn adjust_task_count(&self, id: Uuid, delta: i64) -> DomainResult<()> {
        let result = sqlx::query("UPDATE projects SET task_count = task_count + ?, updated_at = ? WHERE id = ?")
            .bind(delta)
            .bind(format_datetime(Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ProjectNotFound(id));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    user_id: String,
    name: String,
    description: Option<String>,
    task_count: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ProjectRow> for Project {
    type Error = DomainError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: parse_uuid(&row.id)?,
            user_id: UserId::new(parse_uuid(&row.user_id)?),
            name: row.name,
            description: row.description,
            task_count: row.task_count,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
