//! Project and context ("next action") models.
//!
//! Both are named containers for tasks and carry a cached `task_count` that
//! is only ever adjusted incrementally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// A user-owned project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    /// Linked, non-trashed tasks.
    pub task_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(user_id: UserId, name: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            description: description.filter(|d| !d.trim().is_empty()),
            task_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A GTD context, called a "next action" in the user-facing vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub id: Uuid,
    pub user_id: UserId,
    #[serde(rename = "contextName")]
    pub name: String,
    pub task_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Context {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            task_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Which kind of named container a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Project,
    #[serde(rename = "nextAction")]
    Context,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Context => "nextAction",
        }
    }

    /// Human wording used in response messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Context => "next action",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_starts_with_zero_count() {
        let project = Project::new(UserId::new(Uuid::new_v4()), "Launch", None);
        assert_eq!(project.task_count, 0);
        assert_eq!(project.created_at, project.updated_at);
    }

    #[test]
    fn test_blank_description_is_dropped() {
        let project = Project::new(UserId::new(Uuid::new_v4()), "Launch", Some("  ".to_string()));
        assert!(project.description.is_none());
    }

    #[test]
    fn test_context_serializes_context_name() {
        let context = Context::new(UserId::new(Uuid::new_v4()), "@phone");
        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["contextName"], "@phone");
        assert_eq!(value["taskCount"], 0);
    }
}
