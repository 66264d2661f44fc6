//! Taskpilot - natural-language commands for a GTD task store
//!
//! Taskpilot classifies free-text prompts into structured intents through an
//! OpenAI-compatible completion service, resolves loosely named projects,
//! contexts ("next actions") and tasks against a user's records, and applies
//! the resulting change while keeping per-container task counters in step.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Adapters** (`adapters`): SQLite repositories and completion clients
//! - **Service Layer** (`services`): classification, resolution and orchestration
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use taskpilot::services::CommandOrchestrator;
//!
//! let orchestrator = CommandOrchestrator::new(tasks, projects, contexts, client, config.orchestrator);
//! let response = orchestrator.handle(user, "remind me to call Alex tomorrow").await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    CommandResponse, Config, Context, Intent, Outcome, Project, Task, UserId,
};
pub use domain::ports::{CompletionClient, ContextRepository, ProjectRepository, TaskRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CommandOrchestrator, EntityResolver, IntentClassifier, TaskSearch};
