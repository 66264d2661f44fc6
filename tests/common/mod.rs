//! Common test utilities for integration tests
//!
//! Provides a migrated in-memory store, a scripted completion client and an
//! orchestrator wired over both.
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use taskpilot::adapters::completion::ScriptedCompletionClient;
use taskpilot::adapters::sqlite::{
    create_migrated_test_pool, SqliteContextRepository, SqliteProjectRepository, SqliteTaskRepository,
};
use taskpilot::domain::models::{OrchestratorConfig, UserId};
use taskpilot::services::CommandOrchestrator;
use uuid::Uuid;

pub type TestOrchestrator = CommandOrchestrator<
    SqliteTaskRepository,
    SqliteProjectRepository,
    SqliteContextRepository,
    ScriptedCompletionClient,
>;

/// Repositories over one in-memory database.
#[derive(Clone)]
pub struct Store {
    pub tasks: Arc<SqliteTaskRepository>,
    pub projects: Arc<SqliteProjectRepository>,
    pub contexts: Arc<SqliteContextRepository>,
}

pub async fn store() -> Store {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create migrated test pool");
    Store {
        tasks: Arc::new(SqliteTaskRepository::new(pool.clone())),
        projects: Arc::new(SqliteProjectRepository::new(pool.clone())),
        contexts: Arc::new(SqliteContextRepository::new(pool)),
    }
}

pub fn new_user() -> UserId {
    UserId::new(Uuid::new_v4())
}

/// Everything a scenario needs.
pub struct Harness {
    pub store: Store,
    pub client: ScriptedCompletionClient,
    pub orchestrator: TestOrchestrator,
    pub user: UserId,
}

/// Orchestrator with default policy answering from `replies` in order.
pub async fn harness(replies: Vec<Value>) -> Harness {
    harness_with_config(replies, OrchestratorConfig::default()).await
}

pub async fn harness_with_config(replies: Vec<Value>, config: OrchestratorConfig) -> Harness {
    let store = store().await;
    let client = ScriptedCompletionClient::with_json(replies);
    let orchestrator = CommandOrchestrator::new(
        store.tasks.clone(),
        store.projects.clone(),
        store.contexts.clone(),
        Arc::new(client.clone()),
        config,
    );
    Harness {
        store,
        client,
        orchestrator,
        user: new_user(),
    }
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
