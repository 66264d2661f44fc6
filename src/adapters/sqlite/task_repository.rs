//! SQLite implementation of the TaskRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Category, Priority, Task, UserId};
use crate::domain::ports::{CompletionFilter, TaskFilter, TaskRepository};

use super::{format_datetime, parse_datetime, parse_optional_datetime, parse_optional_uuid, parse_uuid};

const TASK_COLUMNS: &str = "id, user_id, project_id, context_id, title, description, due_date, \
     priority, completed, trashed, category, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Build the WHERE clause shared by list, count and bulk completion.
fn filter_clause(filter: &TaskFilter) -> (String, Vec<String>) {
    let mut clause = String::from(" WHERE user_id = ?");
    let mut bindings = vec![filter.user_id.to_string()];

    if !filter.include_trashed {
        clause.push_str(" AND trashed = 0");
    }

    match filter.completion {
        CompletionFilter::Any => {}
        CompletionFilter::OpenOnly => clause.push_str(" AND completed = 0"),
        CompletionFilter::CompletedOnly => clause.push_str(" AND completed = 1"),
    }

    if let Some(project_id) = filter.project_id {
        clause.push_str(" AND project_id = ?");
        bindings.push(project_id.to_string());
    }

    if let Some(context_id) = filter.context_id {
        clause.push_str(" AND context_id = ?");
        bindings.push(context_id.to_string());
    }

    (clause, bindings)
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, task: &Task) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO tasks (id, user_id, project_id, context_id, title, description, due_date,
               priority, completed, trashed, category, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(task.id.to_string())
        .bind(task.user_id.to_string())
        .bind(task.project_id.map(|id| id.to_string()))
        .bind(task.context_id.map(|id| id.to_string()))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date.map(format_datetime))
        .bind(i64::from(task.priority.value()))
        .bind(task.completed)
        .bind(task.trashed)
        .bind(task.category.as_str())
        .bind(format_datetime(task.created_at))
        .bind(format_datetime(task.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, user_id: UserId, id: Uuid) -> DomainResult<Option<Task>> {
        let row: Option<TaskRow> =
            sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ? AND user_id = ?"))
                .bind(id.to_string())
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Task::try_from).transpose()
    }

    async fn update(&self, task: &Task) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE tasks SET project_id = ?, context_id = ?, title = ?, description = ?,
               due_date = ?, priority = ?, completed = ?, trashed = ?, category = ?, updated_at = ?
               WHERE id = ? AND user_id = ?"#,
        )
        .bind(task.project_id.map(|id| id.to_string()))
        .bind(task.context_id.map(|id| id.to_string()))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date.map(format_datetime))
        .bind(i64::from(task.priority.value()))
        .bind(task.completed)
        .bind(task.trashed)
        .bind(task.category.as_str())
        .bind(format_datetime(task.updated_at))
        .bind(task.id.to_string())
        .bind(task.user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TaskNotFound(task.id));
        }

        Ok(())
    }

    async fn list(&self, filter: TaskFilter) -> DomainResult<Vec<Task>> {
        let (clause, bindings) = filter_clause(&filter);
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks{clause} ORDER BY created_at ASC, rowid ASC");

        let mut q = sqlx::query_as::<_, TaskRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<TaskRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn count(&self, filter: TaskFilter) -> DomainResult<u64> {
        let (clause, bindings) = filter_clause(&filter);
        let query = format!("SELECT COUNT(*) FROM tasks{clause}");

        let mut q = sqlx::query_as::<_, (i64,)>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let (count,) = q.fetch_one(&self.pool).await?;
        u64::try_from(count).map_err(|e| DomainError::DatabaseError(e.to_string()))
    }

    async fn complete_matching(&self, filter: TaskFilter) -> DomainResult<u64> {
        let (clause, bindings) = filter_clause(&filter);
        let query = format!("UPDATE tasks SET completed = 1, updated_at = ?{clause} AND completed = 0");

        let mut q = sqlx::query(&query).bind(format_datetime(Utc::now()));
        for binding in &bindings {
            q = q.bind(binding);
        }

        let result = q.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    user_id: String,
    project_id: Option<String>,
    context_id: Option<String>,
    title: String,
    description: String,
    due_date: Option<String>,
    priority: i64,
    completed: bool,
    trashed: bool,
    category: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = DomainError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let category = Category::from_str(&row.category)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid category: {}", row.category)))?;

        Ok(Task {
            id: parse_uuid(&row.id)?,
            user_id: UserId::new(parse_uuid(&row.user_id)?),
            project_id: parse_optional_uuid(row.project_id)?,
            context_id: parse_optional_uuid(row.context_id)?,
            title: row.title,
            description: row.description,
            due_date: parse_optional_datetime(row.due_date)?,
            priority: Priority::from_raw(row.priority),
            completed: row.completed,
            trashed: row.trashed,
            category,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
