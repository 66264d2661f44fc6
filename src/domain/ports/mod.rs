//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces the adapters implement:
//! - TaskRepository, ProjectRepository, ContextRepository: user-scoped storage
//! - CompletionClient: the external chat-completions service
//!
//! Services are generic over these traits so storage and the completion
//! service can be swapped for in-memory pools and scripted mocks in tests.

pub mod completion;
pub mod context_repository;
pub mod project_repository;
pub mod task_repository;

pub use completion::{render_system_prompt, CompletionClient};
pub use context_repository::ContextRepository;
pub use project_repository::ProjectRepository;
pub use task_repository::{CompletionFilter, TaskFilter, TaskRepository};
