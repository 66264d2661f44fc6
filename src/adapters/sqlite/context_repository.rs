//! SQLite implementation of the ContextRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Context, UserId};
use crate::domain::ports::ContextRepository;

use super::{format_datetime, parse_datetime, parse_uuid};

#[derive(Clone)]
pub struct SqliteContextRepository {
    pool: SqlitePool,
}

impl SqliteContextRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContextRepository for SqliteContextRepository {
    async fn create(&self, context: &Context) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO contexts (id, user_id, name, task_count, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(context.id.to_string())
        .bind(context.user_id.to_string())
        .bind(&context.name)
        .bind(context.task_count)
        .bind(format_datetime(context.created_at))
        .bind(format_datetime(context.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, user_id: UserId, id: Uuid) -> DomainResult<Option<Context>> {
        let row: Option<ContextRow> = sqlx::query_as(
            "SELECT id, user_id, name, task_count, created_at, updated_at FROM contexts WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Context::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> DomainResult<Vec<Context>> {
        let rows: Vec<ContextRow> = sqlx::query_as(
            "SELECT id, user_id, name, task_count, created_at, updated_at
             FROM contexts WHERE user_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Context::try_from).collect()
    }

    async fn update(&self, context: &Context) -> DomainResult<()> {
        let result = sqlx::query("UPDATE contexts SET name = ?, updated_at = ? WHERE id = ? AND user_id = ?")
            .bind(&context.name)
            .bind(format_datetime(context.updated_at))
            .bind(context.id.to_string())
            .bind(context.user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ContextNotFound(context.id));
        }

        Ok(())
    }

    async fn adjust_task_count(&self, id: Uuid, delta: i64) -> DomainResult<()> {
        let result = sqlx::query("UPDATE contexts SET task_count = task_count + ?, updated_at = ? WHERE id = ?")
            .bind(delta)
            .bind(format_datetime(Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ContextNotFound(id));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ContextRow {
    id: String,
    user_id: String,
    name: String,
    task_count: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ContextRow> for Context {
    type Error = DomainError;

    fn try_from(row: ContextRow) -> Result<Self, Self::Error> {
        Ok(Context {
            id: parse_uuid(&row.id)?,
            user_id: UserId::new(parse_uuid(&row.user_id)?),
            name: row.name,
            task_count: row.task_count,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
