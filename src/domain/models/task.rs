//! Task domain model.
//!
//! A task belongs to one user and links to at most one project and at most
//! one context. Its category label is always derived from those links.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Task priority: 1 (highest) to 5, or the "unset" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(u8);

impl Priority {
    /// Sentinel for a missing or out-of-range priority.
    pub const UNSET: Self = Self(99);

    /// Normalize a raw value; anything outside 1..=5 becomes [`Priority::UNSET`].
    pub fn from_raw(raw: i64) -> Self {
        match u8::try_from(raw) {
            Ok(p @ 1..=5) => Self(p),
            _ => Self::UNSET,
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_unset(&self) -> bool {
        *self == Self::UNSET
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::UNSET
    }
}

/// Display label derived from a task's project/context links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "inbox")]
    Inbox,
    #[serde(rename = "projects")]
    Projects,
    #[serde(rename = "nextActions")]
    NextActions,
    #[serde(rename = "projects & nextActions")]
    ProjectsAndNextActions,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Projects => "projects",
            Self::NextActions => "nextActions",
            Self::ProjectsAndNextActions => "projects & nextActions",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "inbox" => Some(Self::Inbox),
            "projects" | "project" => Some(Self::Projects),
            "nextactions" | "nextaction" | "next actions" => Some(Self::NextActions),
            "projects & nextactions" => Some(Self::ProjectsAndNextActions),
            _ => None,
        }
    }

    /// The label implied by a task's links.
    pub fn for_links(has_project: bool, has_context: bool) -> Self {
        match (has_project, has_context) {
            (false, false) => Self::Inbox,
            (true, false) => Self::Projects,
            (false, true) => Self::NextActions,
            (true, true) => Self::ProjectsAndNextActions,
        }
    }
}

/// Single derivation point for a task's category, used at every mutation.
///
/// The links always win. A requested label that disagrees with them (the
/// classic case is "inbox" for a task filed under a project) is dropped.
pub fn derive_category(has_project: bool, has_context: bool, requested: Option<&str>) -> Category {
    let derived = Category::for_links(has_project, has_context);
    if let Some(requested) = requested.filter(|r| !r.trim().is_empty()) {
        if Category::from_str(requested) != Some(derived) {
            tracing::debug!(
                requested = requested,
                derived = derived.as_str(),
                "requested category overridden by task links"
            );
        }
    }
    derived
}

/// Parse a due date as RFC 3339 or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// The project/context pair a task is linked to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskLinks {
    pub project_id: Option<Uuid>,
    pub context_id: Option<Uuid>,
}

/// A single actionable item in a user's store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: UserId,
    pub project_id: Option<Uuid>,
    /// Linked context ("next action").
    #[serde(rename = "nextActionId")]
    pub context_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub completed: bool,
    /// Soft-delete flag.
    pub trashed: bool,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create an unlinked inbox task.
    pub fn new(user_id: UserId, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            project_id: None,
            context_id: None,
            title: title.into(),
            description: description.into(),
            due_date: None,
            priority: Priority::default(),
            completed: false,
            trashed: false,
            category: Category::Inbox,
            created_at: now,
            updated_at: now,
        }
    }

    /// Link to a project and context, recomputing the category.
    pub fn with_links(mut self, links: TaskLinks) -> Self {
        self.set_links(links);
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn links(&self) -> TaskLinks {
        TaskLinks {
            project_id: self.project_id,
            context_id: self.context_id,
        }
    }

    /// Replace both links. The category follows.
    pub fn set_links(&mut self, links: TaskLinks) {
        self.project_id = links.project_id;
        self.context_id = links.context_id;
        self.category = derive_category(links.project_id.is_some(), links.context_id.is_some(), None);
    }

    /// Whether the task still counts toward project/context counters.
    pub fn is_live(&self) -> bool {
        !self.trashed
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Task title cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new(Uuid::new_v4())
    }

    #[test]
    fn test_priority_normalization() {
        assert_eq!(Priority::from_raw(1).value(), 1);
        assert_eq!(Priority::from_raw(5).value(), 5);
        assert!(Priority::from_raw(0).is_unset());
        assert!(Priority::from_raw(6).is_unset());
        assert!(Priority::from_raw(-3).is_unset());
        assert_eq!(Priority::from_raw(400).value(), 99);
    }

    #[test]
    fn test_derive_category_from_links() {
        assert_eq!(derive_category(false, false, None), Category::Inbox);
        assert_eq!(derive_category(true, false, None), Category::Projects);
        assert_eq!(derive_category(false, true, None), Category::NextActions);
        assert_eq!(derive_category(true, true, None), Category::ProjectsAndNextActions);
    }

    #[test]
    fn test_derive_category_ignores_inconsistent_request() {
        assert_eq!(derive_category(true, false, Some("inbox")), Category::Projects);
        assert_eq!(derive_category(false, false, Some("projects")), Category::Inbox);
        assert_eq!(derive_category(false, true, Some("work")), Category::NextActions);
    }

    #[test]
    fn test_category_serializes_to_display_label() {
        let json = serde_json::to_string(&Category::ProjectsAndNextActions).unwrap();
        assert_eq!(json, "\"projects & nextActions\"");
        assert_eq!(Category::from_str("NextActions"), Some(Category::NextActions));
    }

    #[test]
    fn test_parse_due_date_formats() {
        let rfc = parse_due_date("2026-10-23T17:00:00+02:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2026-10-23T15:00:00+00:00");

        let day = parse_due_date("2026-10-23").unwrap();
        assert_eq!(day.to_rfc3339(), "2026-10-23T00:00:00+00:00");

        assert!(parse_due_date("").is_none());
        assert!(parse_due_date("next friday").is_none());
    }

    #[test]
    fn test_set_links_recomputes_category() {
        let mut task = Task::new(user(), "Email Sam", "");
        assert_eq!(task.category, Category::Inbox);

        task.set_links(TaskLinks {
            project_id: Some(Uuid::new_v4()),
            context_id: None,
        });
        assert_eq!(task.category, Category::Projects);

        task.set_links(TaskLinks::default());
        assert_eq!(task.category, Category::Inbox);
    }

    #[test]
    fn test_task_validation() {
        assert!(Task::new(user(), "", "desc").validate().is_err());
        assert!(Task::new(user(), "   ", "desc").validate().is_err());
        assert!(Task::new(user(), "Call Alex", "").validate().is_ok());
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task::new(user(), "Call Alex", "");
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("nextActionId").is_some());
        assert!(value.get("dueDate").is_some());
        assert_eq!(value["priority"], 99);
        assert_eq!(value["category"], "inbox");
    }
}
