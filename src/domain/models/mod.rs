pub mod config;
pub mod intent;
pub mod project;
pub mod response;
pub mod task;
pub mod user;

pub use config::{CompletionConfig, Config, DatabaseConfig, LoggingConfig, OrchestratorConfig};
pub use intent::{
    CompletionRequest, Intent, IntentEnvelope, IntentKind, ListRequest, ProjectDraft,
    SummaryRequest, TargetType, TaskDraft, TaskEnvelope, UpdateField, UpdateRequest,
};
pub use project::{Context, EntityKind, Project};
pub use response::{CommandResponse, Outcome, Progress};
pub use task::{derive_category, parse_due_date, Category, Priority, Task, TaskLinks};
pub use user::UserId;
