//! Command orchestration.
//!
//! One call to [`CommandOrchestrator::handle`] classifies a prompt, resolves
//! the names it mentions and runs the matching flow. Misses and ambiguous
//! matches become response outcomes; only failures of the completion
//! service, the store or classification are errors.

use chrono::Utc;
use regex::RegexBuilder;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    parse_due_date, CommandResponse, CompletionRequest, EntityKind, Intent, ListRequest, Outcome,
    OrchestratorConfig, Priority, Progress, ProjectDraft, SummaryRequest, TargetType, Task, TaskDraft,
    UpdateField, UpdateRequest, UserId,
};
use crate::domain::ports::{CompletionClient, ContextRepository, ProjectRepository, TaskFilter, TaskRepository};
use crate::infrastructure::logging::{AuditLogger, AuditOutcome};
use crate::services::context_service::ContextService;
use crate::services::entity_resolver::EntityResolver;
use crate::services::intent_classifier::IntentClassifier;
use crate::services::project_service::ProjectService;
use crate::services::similarity::TASK_MATCH_THRESHOLD;
use crate::services::task_search::{ScoredTask, TaskSearch};
use crate::services::task_service::{NewTask, TaskPatch, TaskService};

const UNKNOWN_MESSAGE: &str = "Sorry, I couldn't understand that request.";
const NO_TASK_MESSAGE: &str = "No matching task found";
const NOTHING_TO_UPDATE_MESSAGE: &str = "Nothing to update";

/// Fields each target type accepts in `fieldsToUpdate`.
fn allowed_fields(target: TargetType) -> &'static [UpdateField] {
    match target {
        TargetType::Task => &[
            UpdateField::Title,
            UpdateField::Description,
            UpdateField::DueDate,
            UpdateField::Priority,
            UpdateField::ProjectName,
            UpdateField::NextActionName,
        ],
        TargetType::Project => &[UpdateField::Title, UpdateField::Description],
        TargetType::Context => &[UpdateField::Title],
    }
}

/// How a fuzzy task search came out.
enum TaskPick {
    None,
    One(Task),
    Many(Vec<Task>),
}

impl From<Vec<ScoredTask>> for TaskPick {
    fn from(mut found: Vec<ScoredTask>) -> Self {
        match found.len() {
            0 => Self::None,
            1 => Self::One(found.remove(0).task),
            _ => Self::Many(found.into_iter().map(|s| s.task).collect()),
        }
    }
}

pub struct CommandOrchestrator<T, P, C, L>
where
    T: TaskRepository,
    P: ProjectRepository,
    C: ContextRepository,
    L: CompletionClient,
{
    classifier: IntentClassifier<L>,
    resolver: EntityResolver<P, C>,
    search: TaskSearch<T>,
    tasks: TaskService<T, P, C>,
    projects: ProjectService<P>,
    contexts: ContextService<C>,
    config: OrchestratorConfig,
    audit: Option<AuditLogger>,
}

impl<T, P, C, L> CommandOrchestrator<T, P, C, L>
where
    T: TaskRepository,
    P: ProjectRepository,
    C: ContextRepository,
    L: CompletionClient,
{
    pub fn new(
        task_repo: Arc<T>,
        project_repo: Arc<P>,
        context_repo: Arc<C>,
        client: Arc<L>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(client),
            resolver: EntityResolver::new(project_repo.clone(), context_repo.clone()),
            search: TaskSearch::new(task_repo.clone()),
            tasks: TaskService::new(task_repo, project_repo.clone(), context_repo.clone()),
            projects: ProjectService::new(project_repo),
            contexts: ContextService::new(context_repo),
            config,
            audit: None,
        }
    }

    /// Record every handled command in the audit trail.
    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// [`handle`](Self::handle) bounded by the configured request deadline.
    pub async fn handle_with_configured_deadline(&self, user: UserId, prompt: &str) -> DomainResult<CommandResponse> {
        let deadline = Duration::from_secs(self.config.request_deadline_secs);
        self.handle_with_deadline(user, prompt, deadline).await
    }

    /// Run one command, giving up once `deadline` passes. Writes committed
    /// before the deadline stay committed.
    pub async fn handle_with_deadline(
        &self,
        user: UserId,
        prompt: &str,
        deadline: Duration,
    ) -> DomainResult<CommandResponse> {
        match tokio::time::timeout(deadline, self.handle(user, prompt)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(user_id = %user, deadline = ?deadline, "command deadline exceeded");
                Err(DomainError::DeadlineExceeded(deadline.as_secs()))
            }
        }
    }

    /// Classify and run one command.
    #[instrument(skip(self, user, prompt), fields(user_id = %user))]
    pub async fn handle(&self, user: UserId, prompt: &str) -> DomainResult<CommandResponse> {
        let intent = self.classifier.classify(prompt).await?;
        let name = intent.kind_name().to_string();
        tracing::info!(intent = %name, "handling command");

        let result = self.execute(user, prompt, intent).await;
        self.audit_command(user, &name, &result).await;
        result
    }

    /// Run an already classified intent.
    pub async fn execute(&self, user: UserId, prompt: &str, intent: Intent) -> DomainResult<CommandResponse> {
        match intent {
            Intent::Chat => {
                let reply = self.classifier.chat(prompt).await?;
                Ok(CommandResponse::done("chat").with_message(reply))
            }
            Intent::Summarize(request) => self.summarize(user, request).await,
            Intent::CreateTask(draft) => self.create_task(user, draft).await,
            Intent::CreateProject(draft) => self.create_project(user, draft).await,
            Intent::Complete(request) => self.complete(user, request).await,
            Intent::Update(request) => self.update(user, request).await,
            Intent::List(request) => self.list(user, request).await,
            Intent::Unknown(raw) => {
                tracing::info!(discriminator = %raw, "unknown intent");
                Ok(CommandResponse::new("unknown", Outcome::Unknown).with_message(UNKNOWN_MESSAGE))
            }
        }
    }

    async fn summarize(&self, user: UserId, request: SummaryRequest) -> DomainResult<CommandResponse> {
        const INTENT: &str = "summarize";
        let (target, name) = match request {
            SummaryRequest::General { context } => {
                let summary = self.classifier.summarize(&context).await?;
                return Ok(CommandResponse::done(INTENT).with_summary(summary));
            }
            SummaryRequest::Progress { target, name } => (target, name),
        };

        let base = TaskFilter::for_user(user);
        match target {
            TargetType::Task => {
                let found = self.search.find_relevant(base, &name, TASK_MATCH_THRESHOLD).await?;
                match TaskPick::from(found) {
                    TaskPick::None => Ok(CommandResponse::not_found(INTENT, NO_TASK_MESSAGE)),
                    TaskPick::Many(tasks) => Ok(ambiguous(INTENT, &name, tasks)),
                    TaskPick::One(task) => {
                        let progress = Progress::new(i64::from(task.completed), 1);
                        let state = if task.completed { "complete" } else { "not complete yet" };
                        Ok(CommandResponse::done(INTENT)
                            .with_message(format!("\"{}\" is {state}", task.title))
                            .with_progress(progress)
                            .with_task(task))
                    }
                }
            }
            TargetType::Project => {
                let Some(project) = self.resolver.find_project(&name, user).await? else {
                    return Ok(not_found_named(INTENT, EntityKind::Project, &name));
                };
                let scope = base.project(project.id);
                let progress = self.progress(scope).await?;
                Ok(CommandResponse::done(INTENT)
                    .with_message(progress_message(&project.name, progress))
                    .with_progress(progress)
                    .with_project(project))
            }
            TargetType::Context => {
                let Some(context) = self.resolver.find_context(&name, user).await? else {
                    return Ok(not_found_named(INTENT, EntityKind::Context, &name));
                };
                let scope = base.context(context.id);
                let progress = self.progress(scope).await?;
                Ok(CommandResponse::done(INTENT)
                    .with_message(progress_message(&context.name, progress))
                    .with_progress(progress)
                    .with_next_action(context))
            }
        }
    }

    async fn progress(&self, scope: TaskFilter) -> DomainResult<Progress> {
        let total = self.tasks.count_tasks(scope.clone()).await?;
        let completed = self.tasks.count_tasks(scope.completed_only()).await?;
        Ok(Progress::new(to_i64(completed), to_i64(total)))
    }

    async fn create_task(&self, user: UserId, draft: TaskDraft) -> DomainResult<CommandResponse> {
        let project = self
            .resolver
            .resolve_by_name(EntityKind::Project, &draft.project_name, user)
            .await?;
        let context = self
            .resolver
            .resolve_by_name(EntityKind::Context, &draft.context_name, user)
            .await?;

        let mut new_task = new_task_from(draft);
        new_task.project_id = project.id();
        new_task.context_id = context.id();
        let task = self.tasks.create_task(user, new_task).await?;

        let mut response = CommandResponse::done("createTask").with_message(format!("Created task \"{}\"", task.title));
        // Reload so the response carries the incremented counters.
        if let Some(id) = task.project_id {
            response = response.with_project(self.projects.get_project(user, id).await?);
        }
        if let Some(id) = task.context_id {
            response = response.with_next_action(self.contexts.get_context(user, id).await?);
        }
        Ok(response.with_task(task))
    }

    async fn create_project(&self, user: UserId, draft: ProjectDraft) -> DomainResult<CommandResponse> {
        let project = self
            .projects
            .create_project(user, &draft.name, Some(draft.description))
            .await?;

        let mut created = Vec::new();
        let mut failed: u64 = 0;
        for task_draft in draft.tasks {
            let title = task_draft.title.clone();
            match self.create_project_task(user, project.id, task_draft).await {
                Ok(task) => created.push(task),
                Err(e) if self.config.partial_failure_tolerant => {
                    failed += 1;
                    tracing::warn!(project_id = %project.id, title = %title, error = %e, "project task creation failed");
                }
                Err(e) => return Err(e),
            }
        }

        let project = self.projects.get_project(user, project.id).await?;
        let mut message = format!("Created project \"{}\" with {} task(s)", project.name, created.len());
        if failed > 0 {
            message.push_str(&format!("; {failed} task(s) could not be created"));
        }
        Ok(CommandResponse::done("createProject")
            .with_message(message)
            .with_count(created.len() as u64)
            .with_failed_count(failed)
            .with_project(project)
            .with_tasks(created))
    }

    async fn create_project_task(&self, user: UserId, project_id: uuid::Uuid, draft: TaskDraft) -> DomainResult<Task> {
        let context = self
            .resolver
            .resolve_by_name(EntityKind::Context, &draft.context_name, user)
            .await?;
        let mut new_task = new_task_from(draft);
        new_task.project_id = Some(project_id);
        new_task.context_id = context.id();
        self.tasks.create_task(user, new_task).await
    }

    async fn complete(&self, user: UserId, request: CompletionRequest) -> DomainResult<CommandResponse> {
        const INTENT: &str = "completeTask";
        let mut scope = TaskFilter::for_user(user).open_only();

        match request.target {
            TargetType::Task => {
                if !request.project_name.is_empty() {
                    let Some(project) = self.resolver.find_project(&request.project_name, user).await? else {
                        return Ok(not_found_named(INTENT, EntityKind::Project, &request.project_name));
                    };
                    scope = scope.project(project.id);
                }
                if !request.context_name.is_empty() {
                    let Some(context) = self.resolver.find_context(&request.context_name, user).await? else {
                        return Ok(not_found_named(INTENT, EntityKind::Context, &request.context_name));
                    };
                    scope = scope.context(context.id);
                }

                let found = self.search.find_relevant(scope, &request.name, TASK_MATCH_THRESHOLD).await?;
                match TaskPick::from(found) {
                    TaskPick::None => Ok(CommandResponse::not_found(INTENT, NO_TASK_MESSAGE)),
                    TaskPick::Many(tasks) => Ok(ambiguous(INTENT, &request.name, tasks)),
                    TaskPick::One(task) => {
                        let task = self.tasks.complete_task(user, task.id).await?;
                        Ok(CommandResponse::done(INTENT)
                            .with_message(format!("Completed \"{}\"", task.title))
                            .with_count(1)
                            .with_task(task))
                    }
                }
            }
            TargetType::Project => {
                let Some(project) = self.resolver.find_project(&request.name, user).await? else {
                    return Ok(not_found_named(INTENT, EntityKind::Project, &request.name));
                };
                let count = self.tasks.complete_all(scope.project(project.id)).await?;
                Ok(CommandResponse::done(INTENT)
                    .with_message(bulk_message(count, EntityKind::Project, &project.name))
                    .with_count(count)
                    .with_project(project))
            }
            TargetType::Context => {
                let Some(context) = self.resolver.find_context(&request.name, user).await? else {
                    return Ok(not_found_named(INTENT, EntityKind::Context, &request.name));
                };
                let count = self.tasks.complete_all(scope.context(context.id)).await?;
                Ok(CommandResponse::done(INTENT)
                    .with_message(bulk_message(count, EntityKind::Context, &context.name))
                    .with_count(count)
                    .with_next_action(context))
            }
        }
    }

    async fn update(&self, user: UserId, mut request: UpdateRequest) -> DomainResult<CommandResponse> {
        const INTENT: &str = "updateEntity";
        let target = request.target;
        let allowed = allowed_fields(target);
        request.fields.retain(|field| {
            let ok = allowed.contains(field);
            if !ok {
                tracing::warn!(field = ?field, target = ?target, "field cannot be updated on this target");
            }
            ok
        });
        if request.fields.is_empty() {
            return Ok(CommandResponse::done(INTENT).with_message(NOTHING_TO_UPDATE_MESSAGE));
        }

        match request.target {
            TargetType::Task => {
                // Located the same way completion locates tasks: open ones only.
                let scope = TaskFilter::for_user(user).open_only();
                let found = self
                    .search
                    .find_relevant(scope, &request.lookup, TASK_MATCH_THRESHOLD)
                    .await?;
                let task = match TaskPick::from(found) {
                    TaskPick::None => return Ok(CommandResponse::not_found(INTENT, NO_TASK_MESSAGE)),
                    TaskPick::Many(tasks) => return Ok(ambiguous(INTENT, &request.lookup, tasks)),
                    TaskPick::One(task) => task,
                };

                let patch = self.task_patch(user, &request).await?;
                if patch.is_empty() {
                    return Ok(CommandResponse::done(INTENT).with_message(NOTHING_TO_UPDATE_MESSAGE));
                }
                let task = self.tasks.update_task(user, task.id, patch).await?;
                Ok(CommandResponse::done(INTENT)
                    .with_message(format!("Updated \"{}\"", task.title))
                    .with_task(task))
            }
            TargetType::Project => {
                let Some(mut project) = self.resolver.find_project(&request.lookup, user).await? else {
                    return Ok(not_found_named(INTENT, EntityKind::Project, &request.lookup));
                };
                let mut changed = false;
                if request.wants(UpdateField::Title) && !request.new_title.trim().is_empty() {
                    project = self.projects.rename_project(user, project.id, &request.new_title).await?;
                    changed = true;
                }
                if request.wants(UpdateField::Description) {
                    project = self.projects.describe_project(user, project.id, &request.description).await?;
                    changed = true;
                }
                if !changed {
                    return Ok(CommandResponse::done(INTENT).with_message(NOTHING_TO_UPDATE_MESSAGE));
                }
                Ok(CommandResponse::done(INTENT)
                    .with_message(format!("Updated project \"{}\"", project.name))
                    .with_project(project))
            }
            TargetType::Context => {
                let Some(context) = self.resolver.find_context(&request.lookup, user).await? else {
                    return Ok(not_found_named(INTENT, EntityKind::Context, &request.lookup));
                };
                if request.new_title.trim().is_empty() {
                    return Ok(CommandResponse::done(INTENT).with_message(NOTHING_TO_UPDATE_MESSAGE));
                }
                let context = self.contexts.rename_context(user, context.id, &request.new_title).await?;
                Ok(CommandResponse::done(INTENT)
                    .with_message(format!("Updated next action \"{}\"", context.name))
                    .with_next_action(context))
            }
        }
    }

    /// Build a patch from the requested fields. Re-linking resolves names
    /// with create-on-miss; an empty name unlinks.
    async fn task_patch(&self, user: UserId, request: &UpdateRequest) -> DomainResult<TaskPatch> {
        let mut patch = TaskPatch::default();
        for field in &request.fields {
            match field {
                UpdateField::Title => {
                    let title = request.new_title.trim();
                    if title.is_empty() {
                        tracing::warn!("title update requested without a new title");
                    } else {
                        patch.title = Some(title.to_string());
                    }
                }
                UpdateField::Description => patch.description = Some(request.description.clone()),
                UpdateField::DueDate => match parse_due_date(&request.due_date) {
                    Some(due) => patch.due_date = Some(due),
                    None => tracing::warn!(due_date = %request.due_date, "ignoring unparseable due date"),
                },
                UpdateField::Priority => {
                    patch.priority = Some(request.priority.map_or(Priority::UNSET, Priority::from_raw));
                }
                UpdateField::ProjectName => {
                    let resolution = self
                        .resolver
                        .resolve_by_name(EntityKind::Project, &request.project_name, user)
                        .await?;
                    patch.project_id = Some(resolution.id());
                }
                UpdateField::NextActionName => {
                    let resolution = self
                        .resolver
                        .resolve_by_name(EntityKind::Context, &request.context_name, user)
                        .await?;
                    patch.context_id = Some(resolution.id());
                }
            }
        }
        Ok(patch)
    }

    async fn list(&self, user: UserId, request: ListRequest) -> DomainResult<CommandResponse> {
        const INTENT: &str = "list";
        let query = request.query.to_lowercase();
        let keep = |name: &str| query.is_empty() || name.to_lowercase().contains(&query);

        match request.target {
            TargetType::Project => {
                let projects: Vec<_> = self
                    .projects
                    .list_projects(user)
                    .await?
                    .into_iter()
                    .filter(|p| keep(&p.name))
                    .collect();
                Ok(CommandResponse::done(INTENT)
                    .with_count(projects.len() as u64)
                    .with_projects(projects))
            }
            TargetType::Context => {
                let contexts: Vec<_> = self
                    .contexts
                    .list_contexts(user)
                    .await?
                    .into_iter()
                    .filter(|c| keep(&c.name))
                    .collect();
                Ok(CommandResponse::done(INTENT)
                    .with_count(contexts.len() as u64)
                    .with_next_actions(contexts))
            }
            TargetType::Task => self.list_tasks(user, &request.query).await,
        }
    }

    /// Task listing. A non-empty query is tried as a project name, then a
    /// context name, then a title pattern; the first that applies wins.
    async fn list_tasks(&self, user: UserId, query: &str) -> DomainResult<CommandResponse> {
        const INTENT: &str = "list";
        let open = TaskFilter::for_user(user).open_only();

        if query.is_empty() {
            let tasks = self.tasks.list_tasks(open).await?;
            return Ok(CommandResponse::done(INTENT).with_count(tasks.len() as u64).with_tasks(tasks));
        }

        if let Some(project) = self.resolver.find_project(query, user).await? {
            let tasks = self.tasks.list_tasks(open.project(project.id)).await?;
            return Ok(CommandResponse::done(INTENT)
                .with_count(tasks.len() as u64)
                .with_tasks(tasks)
                .with_project(project));
        }

        if let Some(context) = self.resolver.find_context(query, user).await? {
            let tasks = self.tasks.list_tasks(open.context(context.id)).await?;
            return Ok(CommandResponse::done(INTENT)
                .with_count(tasks.len() as u64)
                .with_tasks(tasks)
                .with_next_action(context));
        }

        let pattern = match RegexBuilder::new(query).case_insensitive(true).build() {
            Ok(pattern) => pattern,
            Err(_) => RegexBuilder::new(&regex::escape(query))
                .case_insensitive(true)
                .build()
                .map_err(|e| DomainError::ValidationFailed(e.to_string()))?,
        };
        let tasks: Vec<Task> = self
            .tasks
            .list_tasks(open)
            .await?
            .into_iter()
            .filter(|t| pattern.is_match(&t.title))
            .collect();
        Ok(CommandResponse::done(INTENT).with_count(tasks.len() as u64).with_tasks(tasks))
    }

    async fn audit_command(&self, user: UserId, intent: &str, result: &DomainResult<CommandResponse>) {
        let Some(audit) = &self.audit else {
            return;
        };

        let (outcome, metadata) = match result {
            Ok(response) => {
                let outcome = match response.failed_count {
                    Some(failed) if failed > 0 => AuditOutcome::PartialSuccess,
                    _ => AuditOutcome::Success,
                };
                (outcome, json!({ "outcome": response.outcome, "count": response.count }))
            }
            Err(e) => (AuditOutcome::Failure, json!({ "error": e.to_string() })),
        };
        let resource_id = result.as_ref().ok().and_then(|r| {
            r.task
                .as_ref()
                .map(|t| t.id)
                .or_else(|| r.project.as_ref().map(|p| p.id))
                .or_else(|| r.next_action.as_ref().map(|c| c.id))
                .map(|id| id.to_string())
        });

        if let Err(e) = audit
            .log_operation(intent, &user.to_string(), resource_id.as_deref(), outcome, Some(metadata))
            .await
        {
            tracing::warn!(error = %e, "failed to write command audit event");
        }
    }
}

fn new_task_from(draft: TaskDraft) -> NewTask {
    NewTask {
        title: draft.title,
        description: draft.description,
        due_date: Some(parse_due_date(&draft.due_date).unwrap_or_else(Utc::now)),
        priority: draft.priority.map_or(Priority::UNSET, Priority::from_raw),
        category: Some(draft.category).filter(|c| !c.trim().is_empty()),
        project_id: None,
        context_id: None,
    }
}

fn ambiguous(intent: &str, name: &str, tasks: Vec<Task>) -> CommandResponse {
    CommandResponse::new(intent, Outcome::Ambiguous)
        .with_message(format!(
            "{} tasks match \"{name}\"; which one did you mean?",
            tasks.len()
        ))
        .with_count(tasks.len() as u64)
        .with_tasks(tasks)
}

fn not_found_named(intent: &str, kind: EntityKind, name: &str) -> CommandResponse {
    CommandResponse::not_found(intent, format!("No {} named \"{name}\" was found", kind.label()))
}

fn bulk_message(count: u64, kind: EntityKind, name: &str) -> String {
    format!("Marked {count} task(s) in {} \"{name}\" complete", kind.label())
}

fn progress_message(name: &str, progress: Progress) -> String {
    format!(
        "\"{name}\" is {}% complete ({} of {} tasks)",
        progress.percent, progress.completed, progress.total
    )
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
