//! End-to-end command scenarios over an in-memory store and scripted
//! completion replies.
//!
//! ## Test coverage:
//! 1. Task creation with create-on-miss project resolution
//! 2. Completion: zero, one and many matches; scoped search; bulk by project
//! 3. Updates: field allow-list, re-linking, container renames
//! 4. Listing: project, context and title fallbacks
//! 5. Summaries: progress and free-form
//! 6. Project batches under both failure policies
//! 7. Unknown intents, classification and upstream failures, deadlines

mod common;

use std::time::Duration;

use chrono::{Datelike, Utc};
use serde_json::json;
use taskpilot::adapters::completion::{ScriptedCompletionClient, ScriptedReply};
use taskpilot::domain::errors::DomainError;
use taskpilot::domain::models::{
    Category, Context, OrchestratorConfig, Outcome, Priority, Project, Task, TaskLinks, UserId,
};
use taskpilot::domain::ports::{ContextRepository, ProjectRepository, TaskFilter, TaskRepository};
use taskpilot::services::CommandOrchestrator;

use common::{harness, harness_with_config, new_user, Store};

async fn add_project(store: &Store, user: UserId, name: &str) -> Project {
    let project = Project::new(user, name, None);
    store.projects.create(&project).await.unwrap();
    project
}

async fn add_context(store: &Store, user: UserId, name: &str) -> Context {
    let context = Context::new(user, name);
    store.contexts.create(&context).await.unwrap();
    context
}

/// Insert a live task and bump counters the way the task service would.
async fn add_task(store: &Store, user: UserId, title: &str, links: TaskLinks) -> Task {
    let task = Task::new(user, title, "").with_links(links);
    store.tasks.create(&task).await.unwrap();
    if let Some(id) = links.project_id {
        store.projects.adjust_task_count(id, 1).await.unwrap();
    }
    if let Some(id) = links.context_id {
        store.contexts.adjust_task_count(id, 1).await.unwrap();
    }
    task
}

fn in_project(project: &Project) -> TaskLinks {
    TaskLinks {
        project_id: Some(project.id),
        context_id: None,
    }
}

fn in_context(context: &Context) -> TaskLinks {
    TaskLinks {
        project_id: None,
        context_id: Some(context.id),
    }
}

// =============================================================================
// 1. TASK CREATION
// =============================================================================

#[tokio::test]
async fn test_create_task_in_new_project_launch() {
    let h = harness(vec![
        json!({"intent": "createTask", "userPrompt": "Create a task to email Sam about the launch in project Launch"}),
        json!({
            "title": "Email Sam about the launch",
            "description": "",
            "dueDate": "2026-10-23",
            "priority": 3,
            "category": "inbox",
            "projectName": "Launch",
            "nextActionName": null
        }),
    ])
    .await;

    let response = h
        .orchestrator
        .handle(h.user, "Create a task to email Sam about the launch in project Launch")
        .await
        .unwrap();
    assert_eq!(response.outcome, Outcome::Done);
    assert_eq!(response.intent, "createTask");

    let projects = h.store.projects.list_for_user(h.user).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Launch");
    assert_eq!(projects[0].task_count, 1);

    let tasks = h.store.tasks.list(TaskFilter::for_user(h.user)).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].project_id, Some(projects[0].id));
    assert_eq!(tasks[0].category, Category::Projects);
    assert_eq!(tasks[0].priority, Priority::from_raw(3));
    assert_eq!(tasks[0].due_date.unwrap().day(), 23);

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["task"]["category"], "projects");
    assert_eq!(value["project"]["taskCount"], 1);
}

#[tokio::test]
async fn test_create_task_reuses_existing_context_and_defaults() {
    let h = harness(vec![
        json!({"intent": "createTask"}),
        json!({"title": "Call Alex", "nextActionName": "@PHONE", "priority": 42, "dueDate": "someday"}),
    ])
    .await;
    let phone = add_context(&h.store, h.user, "@phone").await;

    let before = Utc::now();
    let response = h.orchestrator.handle(h.user, "call Alex").await.unwrap();
    let task = response.task.unwrap();

    assert_eq!(task.context_id, Some(phone.id));
    assert_eq!(task.category, Category::NextActions);
    assert!(task.priority.is_unset());
    assert!(task.due_date.unwrap() >= before);
    assert_eq!(h.store.contexts.list_for_user(h.user).await.unwrap().len(), 1);
    assert_eq!(response.next_action.unwrap().task_count, 1);
}

// =============================================================================
// 2. COMPLETION
// =============================================================================

#[tokio::test]
async fn test_mark_budget_project_done_completes_budget_review() {
    let h = harness(vec![
        json!({"intent": "completeTask"}),
        json!({"intentType": "project", "projectName": "budget"}),
    ])
    .await;
    let review = add_project(&h.store, h.user, "Budget Review").await;
    let launch = add_project(&h.store, h.user, "Launch").await;
    add_task(&h.store, h.user, "Collect receipts", in_project(&review)).await;
    add_task(&h.store, h.user, "Reconcile card", in_project(&review)).await;
    let mut done = add_task(&h.store, h.user, "Export ledger", in_project(&review)).await;
    done.completed = true;
    h.store.tasks.update(&done).await.unwrap();
    add_task(&h.store, h.user, "Email Sam", in_project(&launch)).await;

    let response = h.orchestrator.handle(h.user, "mark budget project done").await.unwrap();

    assert_eq!(response.outcome, Outcome::Done);
    assert_eq!(response.count, Some(2));
    assert_eq!(response.project.as_ref().map(|p| p.id), Some(review.id));

    let open_review = h
        .store
        .tasks
        .count(TaskFilter::for_user(h.user).project(review.id).open_only())
        .await
        .unwrap();
    assert_eq!(open_review, 0);
    let open_launch = h
        .store
        .tasks
        .count(TaskFilter::for_user(h.user).project(launch.id).open_only())
        .await
        .unwrap();
    assert_eq!(open_launch, 1);
}

#[tokio::test]
async fn test_complete_single_match() {
    let h = harness(vec![
        json!({"intent": "completeTask"}),
        json!({"entityType": "task", "title": "email sam"}),
    ])
    .await;
    let email = add_task(&h.store, h.user, "Email Sam", TaskLinks::default()).await;
    let call = add_task(&h.store, h.user, "Call Alex", TaskLinks::default()).await;

    let response = h.orchestrator.handle(h.user, "I emailed Sam").await.unwrap();
    assert_eq!(response.outcome, Outcome::Done);
    assert_eq!(response.task.as_ref().map(|t| t.id), Some(email.id));

    assert!(h.store.tasks.get(h.user, email.id).await.unwrap().unwrap().completed);
    assert!(!h.store.tasks.get(h.user, call.id).await.unwrap().unwrap().completed);
}

#[tokio::test]
async fn test_complete_zero_matches_mutates_nothing() {
    let h = harness(vec![
        json!({"intent": "completeTask"}),
        json!({"entityType": "task", "title": "renew passport"}),
    ])
    .await;
    add_task(&h.store, h.user, "Email Sam", TaskLinks::default()).await;

    let response = h.orchestrator.handle(h.user, "passport renewed").await.unwrap();
    assert_eq!(response.outcome, Outcome::NotFound);
    assert_eq!(response.message.as_deref(), Some("No matching task found"));
    let open = h.store.tasks.count(TaskFilter::for_user(h.user).open_only()).await.unwrap();
    assert_eq!(open, 1);
}

#[tokio::test]
async fn test_complete_many_matches_lists_candidates() {
    let h = harness(vec![
        json!({"intent": "completeTask"}),
        json!({"entityType": "task", "title": "email sam"}),
    ])
    .await;
    let first = add_task(&h.store, h.user, "Email Sam", TaskLinks::default()).await;
    let second = add_task(&h.store, h.user, "Email Sam about budget", TaskLinks::default()).await;

    let response = h.orchestrator.handle(h.user, "done emailing Sam").await.unwrap();
    assert_eq!(response.outcome, Outcome::Ambiguous);
    let ids: Vec<_> = response.tasks.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);

    let open = h.store.tasks.count(TaskFilter::for_user(h.user).open_only()).await.unwrap();
    assert_eq!(open, 2);
}

#[tokio::test]
async fn test_complete_scoped_to_project() {
    let h = harness(vec![
        json!({"intent": "completeTask"}),
        json!({"entityType": "task", "title": "Email Sam", "projectName": "launch"}),
    ])
    .await;
    let launch = add_project(&h.store, h.user, "Launch").await;
    let inbox = add_task(&h.store, h.user, "Email Sam", TaskLinks::default()).await;
    let scoped = add_task(&h.store, h.user, "Email Sam", in_project(&launch)).await;

    let response = h.orchestrator.handle(h.user, "emailed Sam for launch").await.unwrap();
    assert_eq!(response.task.map(|t| t.id), Some(scoped.id));
    assert!(!h.store.tasks.get(h.user, inbox.id).await.unwrap().unwrap().completed);
}

#[tokio::test]
async fn test_complete_with_unknown_scope_is_not_found() {
    let h = harness(vec![
        json!({"intent": "completeTask"}),
        json!({"entityType": "task", "title": "Email Sam", "projectName": "Gardening"}),
    ])
    .await;
    add_task(&h.store, h.user, "Email Sam", TaskLinks::default()).await;

    let response = h.orchestrator.handle(h.user, "emailed Sam for gardening").await.unwrap();
    assert_eq!(response.outcome, Outcome::NotFound);
    assert!(h.store.projects.list_for_user(h.user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_complete_ignores_other_users_tasks() {
    let h = harness(vec![
        json!({"intent": "completeTask"}),
        json!({"entityType": "task", "title": "Email Sam"}),
    ])
    .await;
    let stranger = new_user();
    let theirs = add_task(&h.store, stranger, "Email Sam", TaskLinks::default()).await;

    let response = h.orchestrator.handle(h.user, "emailed Sam").await.unwrap();
    assert_eq!(response.outcome, Outcome::NotFound);
    assert!(!h.store.tasks.get(stranger, theirs.id).await.unwrap().unwrap().completed);
}

// =============================================================================
// 3. UPDATES
// =============================================================================

#[tokio::test]
async fn test_update_applies_only_listed_fields() {
    let h = harness(vec![
        json!({"intent": "updateEntity"}),
        json!({
            "entityType": "task",
            "title": "call alex",
            "fieldsToUpdate": ["title", "priority", "colour"],
            "newTitle": "Call Alex back",
            "priority": 1,
            "description": "should not be applied"
        }),
    ])
    .await;
    let task = add_task(&h.store, h.user, "Call Alex", TaskLinks::default()).await;

    let response = h.orchestrator.handle(h.user, "rename and prioritise").await.unwrap();
    assert_eq!(response.outcome, Outcome::Done);

    let stored = h.store.tasks.get(h.user, task.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Call Alex back");
    assert_eq!(stored.priority.value(), 1);
    assert_eq!(stored.description, "");
}

#[tokio::test]
async fn test_update_relinks_project_and_moves_counters() {
    let h = harness(vec![
        json!({"intent": "updateEntity"}),
        json!({
            "entityType": "task",
            "title": "Fix fence",
            "fieldsToUpdate": ["projectName"],
            "projectName": "Home"
        }),
    ])
    .await;
    let launch = add_project(&h.store, h.user, "Launch").await;
    let task = add_task(&h.store, h.user, "Fix fence", in_project(&launch)).await;

    h.orchestrator.handle(h.user, "move fence to Home").await.unwrap();

    let projects = h.store.projects.list_for_user(h.user).await.unwrap();
    let home = projects.iter().find(|p| p.name == "Home").unwrap();
    let launch = projects.iter().find(|p| p.name == "Launch").unwrap();
    assert_eq!(home.task_count, 1);
    assert_eq!(launch.task_count, 0);

    let stored = h.store.tasks.get(h.user, task.id).await.unwrap().unwrap();
    assert_eq!(stored.project_id, Some(home.id));
    assert_eq!(stored.category, Category::Projects);
}

#[tokio::test]
async fn test_update_empty_context_name_unlinks() {
    let h = harness(vec![
        json!({"intent": "updateEntity"}),
        json!({
            "entityType": "task",
            "title": "Call Alex",
            "fieldsToUpdate": ["nextActionName"],
            "nextActionName": ""
        }),
    ])
    .await;
    let phone = add_context(&h.store, h.user, "@phone").await;
    let task = add_task(&h.store, h.user, "Call Alex", in_context(&phone)).await;

    h.orchestrator.handle(h.user, "Alex no longer needs the phone").await.unwrap();

    let stored = h.store.tasks.get(h.user, task.id).await.unwrap().unwrap();
    assert!(stored.context_id.is_none());
    assert_eq!(stored.category, Category::Inbox);
    let phone = h.store.contexts.get(h.user, phone.id).await.unwrap().unwrap();
    assert_eq!(phone.task_count, 0);
}

#[tokio::test]
async fn test_rename_project() {
    let h = harness(vec![
        json!({"intent": "updateEntity"}),
        json!({
            "entityType": "project",
            "projectName": "launch",
            "fieldsToUpdate": ["title", "priority"],
            "newTitle": "Launch 2.0"
        }),
    ])
    .await;
    let launch = add_project(&h.store, h.user, "Launch").await;

    let response = h.orchestrator.handle(h.user, "rename launch").await.unwrap();
    assert_eq!(response.project.map(|p| p.name), Some("Launch 2.0".to_string()));
    let stored = h.store.projects.get(h.user, launch.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Launch 2.0");
}

#[tokio::test]
async fn test_update_without_fields_is_informational() {
    let h = harness(vec![
        json!({"intent": "updateEntity"}),
        json!({"entityType": "task", "title": "Call Alex", "fieldsToUpdate": []}),
    ])
    .await;
    let task = add_task(&h.store, h.user, "Call Alex", TaskLinks::default()).await;

    let response = h.orchestrator.handle(h.user, "change Alex").await.unwrap();
    assert_eq!(response.outcome, Outcome::Done);
    assert!(response.task.is_none());
    assert_eq!(h.client.remaining().await, 0);
    let stored = h.store.tasks.get(h.user, task.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Call Alex");
}

#[tokio::test]
async fn test_update_skips_completed_task_with_same_title() {
    let h = harness(vec![
        json!({"intent": "updateEntity"}),
        json!({
            "entityType": "task",
            "title": "Email Sam",
            "fieldsToUpdate": ["priority"],
            "priority": 1
        }),
    ])
    .await;
    let mut done = add_task(&h.store, h.user, "Email Sam", TaskLinks::default()).await;
    done.completed = true;
    h.store.tasks.update(&done).await.unwrap();
    let open = add_task(&h.store, h.user, "Email Sam", TaskLinks::default()).await;

    let response = h.orchestrator.handle(h.user, "Sam is urgent").await.unwrap();
    assert_eq!(response.outcome, Outcome::Done);
    assert_eq!(response.task.map(|t| t.id), Some(open.id));

    let stored = h.store.tasks.get(h.user, open.id).await.unwrap().unwrap();
    assert_eq!(stored.priority.value(), 1);
    let untouched = h.store.tasks.get(h.user, done.id).await.unwrap().unwrap();
    assert!(untouched.priority.is_unset());
}

// =============================================================================
// 4. LISTING
// =============================================================================

struct ListFixture {
    h: common::Harness,
}

async fn list_fixture(query: &str, entity_type: &str) -> ListFixture {
    let h = harness(vec![
        json!({"intent": "list"}),
        json!({"entityType": entity_type, "query": query}),
    ])
    .await;
    let launch = add_project(&h.store, h.user, "Launch").await;
    let phone = add_context(&h.store, h.user, "@phone").await;
    add_task(&h.store, h.user, "Email Sam", in_project(&launch)).await;
    add_task(&h.store, h.user, "Call Alex", in_context(&phone)).await;
    add_task(&h.store, h.user, "Buy milk", TaskLinks::default()).await;
    let mut bread = add_task(&h.store, h.user, "Buy bread", TaskLinks::default()).await;
    bread.completed = true;
    h.store.tasks.update(&bread).await.unwrap();
    ListFixture { h }
}

async fn listed_titles(fixture: &ListFixture) -> Vec<String> {
    let response = fixture.h.orchestrator.handle(fixture.h.user, "show me").await.unwrap();
    response
        .tasks
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.title)
        .collect()
}

#[tokio::test]
async fn test_list_all_open_tasks() {
    let fixture = list_fixture("", "task").await;
    assert_eq!(listed_titles(&fixture).await, vec!["Email Sam", "Call Alex", "Buy milk"]);
}

#[tokio::test]
async fn test_list_query_as_project_then_context() {
    let fixture = list_fixture("launch", "task").await;
    assert_eq!(listed_titles(&fixture).await, vec!["Email Sam"]);

    let fixture = list_fixture("@phone", "tasks").await;
    assert_eq!(listed_titles(&fixture).await, vec!["Call Alex"]);
}

#[tokio::test]
async fn test_list_query_falls_back_to_title_pattern() {
    let fixture = list_fixture("^buy", "task").await;
    assert_eq!(listed_titles(&fixture).await, vec!["Buy milk"]);

    let fixture = list_fixture("milk(", "task").await;
    assert!(listed_titles(&fixture).await.is_empty());
}

#[tokio::test]
async fn test_list_projects_and_contexts() {
    let fixture = list_fixture("", "project").await;
    let response = fixture.h.orchestrator.handle(fixture.h.user, "projects?").await.unwrap();
    assert_eq!(response.count, Some(1));
    assert_eq!(response.projects.unwrap()[0].name, "Launch");

    let fixture = list_fixture("PHO", "nextAction").await;
    let response = fixture.h.orchestrator.handle(fixture.h.user, "contexts?").await.unwrap();
    assert_eq!(response.next_actions.unwrap()[0].name, "@phone");
}

// =============================================================================
// 5. SUMMARIES
// =============================================================================

#[tokio::test]
async fn test_project_progress() {
    let h = harness(vec![
        json!({"intent": "summarize"}),
        json!({"entityType": "project", "projectName": "Launch"}),
    ])
    .await;
    let launch = add_project(&h.store, h.user, "Launch").await;
    for title in ["One", "Two", "Three"] {
        add_task(&h.store, h.user, title, in_project(&launch)).await;
    }
    let mut done = add_task(&h.store, h.user, "Four", in_project(&launch)).await;
    done.completed = true;
    h.store.tasks.update(&done).await.unwrap();

    let response = h.orchestrator.handle(h.user, "how is Launch going?").await.unwrap();
    let progress = response.progress.unwrap();
    assert_eq!((progress.completed, progress.total, progress.percent), (1, 4, 25));
}

#[tokio::test]
async fn test_empty_context_progress_is_zero() {
    let h = harness(vec![
        json!({"intent": "summarize"}),
        json!({"entityType": "nextAction", "nextActionName": "@errands"}),
    ])
    .await;
    add_context(&h.store, h.user, "@errands").await;

    let response = h.orchestrator.handle(h.user, "errands progress").await.unwrap();
    let progress = response.progress.unwrap();
    assert_eq!((progress.completed, progress.total, progress.percent), (0, 0, 0));
}

#[tokio::test]
async fn test_progress_of_missing_project_creates_nothing() {
    let h = harness(vec![
        json!({"intent": "summarize"}),
        json!({"entityType": "project", "projectName": "Garden"}),
    ])
    .await;

    let response = h.orchestrator.handle(h.user, "garden progress").await.unwrap();
    assert_eq!(response.outcome, Outcome::NotFound);
    assert!(h.store.projects.list_for_user(h.user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_general_summary() {
    let h = harness(vec![
        json!({"intent": "summarize"}),
        json!({"entityType": "", "context": "Shipped v1. Missed two deadlines."}),
    ])
    .await;
    h.client.push(ScriptedReply::text("- Shipped v1\n- Plan buffers")).await;

    let response = h.orchestrator.handle(h.user, "summarize my week").await.unwrap();
    assert_eq!(response.summary.as_deref(), Some("- Shipped v1\n- Plan buffers"));

    let requests = h.client.requests().await;
    assert!(requests[2].user_prompt.ends_with("Shipped v1. Missed two deadlines."));
}

// =============================================================================
// 6. PROJECT BATCHES
// =============================================================================

fn project_with_bad_task() -> Vec<serde_json::Value> {
    vec![
        json!({"intent": "createProject"}),
        json!({
            "projectName": "Move house",
            "projectDescription": "Relocate by December",
            "tasks": [
                {"title": "Book movers", "priority": 2},
                {"title": "   "},
                {"title": "Pack kitchen", "nextActionName": "@home"}
            ]
        }),
    ]
}

#[tokio::test]
async fn test_create_project_tolerates_failed_tasks() {
    let h = harness(project_with_bad_task()).await;

    let response = h.orchestrator.handle(h.user, "plan my move").await.unwrap();
    assert_eq!(response.count, Some(2));
    assert_eq!(response.failed_count, Some(1));

    let project = response.project.unwrap();
    assert_eq!(project.task_count, 2);
    assert_eq!(project.description.as_deref(), Some("Relocate by December"));

    let tasks = response.tasks.unwrap();
    assert_eq!(tasks[0].category, Category::Projects);
    assert_eq!(tasks[1].category, Category::ProjectsAndNextActions);
    let home = h.store.contexts.list_for_user(h.user).await.unwrap();
    assert_eq!(home[0].task_count, 1);
}

#[tokio::test]
async fn test_create_project_strict_policy_aborts() {
    let config = OrchestratorConfig {
        partial_failure_tolerant: false,
        ..OrchestratorConfig::default()
    };
    let h = harness_with_config(project_with_bad_task(), config).await;

    let err = h.orchestrator.handle(h.user, "plan my move").await.unwrap_err();
    assert!(matches!(err, DomainError::ValidationFailed(_)));

    // Writes before the failure stay committed.
    let projects = h.store.projects.list_for_user(h.user).await.unwrap();
    assert_eq!(projects[0].task_count, 1);
}

// =============================================================================
// 7. FAILURES AND EDGES
// =============================================================================

#[tokio::test]
async fn test_unknown_intent_message() {
    let h = harness(vec![json!({"intent": "orderPizza"})]).await;
    let response = h.orchestrator.handle(h.user, "pizza please").await.unwrap();
    assert_eq!(response.outcome, Outcome::Unknown);
    assert!(response.message.unwrap().contains("couldn't understand"));
}

#[tokio::test]
async fn test_unknown_entity_type_is_not_understood() {
    let h = harness(vec![
        json!({"intent": "completeTask"}),
        json!({"entityType": "calendar", "title": "standup"}),
    ])
    .await;
    let standup = add_task(&h.store, h.user, "standup", TaskLinks::default()).await;

    let response = h.orchestrator.handle(h.user, "standup is done").await.unwrap();
    assert_eq!(response.outcome, Outcome::Unknown);
    assert_eq!(response.intent, "unknown");
    assert_eq!(
        response.message.as_deref(),
        Some("Sorry, I couldn't understand that request.")
    );
    assert!(!h.store.tasks.get(h.user, standup.id).await.unwrap().unwrap().completed);
}

#[tokio::test]
async fn test_invalid_json_surfaces_parser_detail() {
    let h = harness(vec![]).await;
    h.client.push(ScriptedReply::text("```json\n{\"intent\": \"chat\"}\n```")).await;

    let err = h.orchestrator.handle(h.user, "hi").await.unwrap_err();
    assert!(matches!(err, DomainError::ClassificationParse(_)));
    assert!(err.public_message().starts_with("AI response did not match the expected format"));
}

#[tokio::test]
async fn test_upstream_failure_is_generic_at_the_boundary() {
    let h = harness(vec![]).await;
    h.client
        .push(ScriptedReply::Upstream("Groq API error: invalid key".to_string()))
        .await;

    let err = h.orchestrator.handle(h.user, "hi").await.unwrap_err();
    assert!(err.is_upstream());
    assert!(!err.public_message().contains("invalid key"));
}

#[tokio::test]
async fn test_deadline_aborts_slow_completion() {
    let store = common::store().await;
    let client = ScriptedCompletionClient::with_json([json!({"intent": "chat"}), json!("unused")])
        .with_delay(Duration::from_millis(250));
    let orchestrator = CommandOrchestrator::new(
        store.tasks.clone(),
        store.projects.clone(),
        store.contexts.clone(),
        std::sync::Arc::new(client.clone()),
        OrchestratorConfig::default(),
    );

    let result = orchestrator
        .handle_with_deadline(new_user(), "hi", Duration::from_millis(50))
        .await;
    assert!(matches!(result, Err(DomainError::DeadlineExceeded(_))));
    assert_eq!(client.remaining().await, 2);
}
