pub mod context_service;
pub mod counter_updater;
pub mod entity_resolver;
pub mod intent_classifier;
pub mod orchestrator;
pub mod project_service;
pub mod prompts;
pub mod similarity;
pub mod task_search;
pub mod task_service;

pub use context_service::ContextService;
pub use counter_updater::CounterUpdater;
pub use entity_resolver::{EntityResolver, Resolution, Resolved};
pub use intent_classifier::IntentClassifier;
pub use orchestrator::CommandOrchestrator;
pub use project_service::ProjectService;
pub use similarity::{FUZZY_MATCH_THRESHOLD, TASK_MATCH_THRESHOLD};
pub use task_search::{ScoredTask, TaskSearch};
pub use task_service::{NewTask, TaskPatch, TaskService};
