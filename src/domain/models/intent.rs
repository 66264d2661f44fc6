//! Intent envelope and the typed intents validated from it.
//!
//! The completion service answers with a flat JSON envelope whose populated
//! fields depend on the intent. [`IntentEnvelope::parse`] reads that text
//! strictly; [`Intent::from_envelope`] then checks the fields a given intent
//! requires and produces one variant of the tagged union.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Treat an explicit JSON `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Priorities show up as numbers, numeric strings, or null.
fn lenient_priority<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Int(n)) => Some(n),
        #[allow(clippy::cast_possible_truncation)]
        Some(Raw::Float(f)) => Some(f.round() as i64),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
    })
}

/// One task entry embedded in a project-creation envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub due_date: String,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_action_name: String,
}

/// Flat envelope returned by every classification template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentEnvelope {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default, alias = "intentType", deserialize_with = "null_as_default")]
    pub entity_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_prompt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub context: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_action_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<TaskEnvelope>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub due_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields_to_update: Vec<String>,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
}

impl IntentEnvelope {
    /// Parse completion text as an envelope. Only surrounding whitespace is
    /// tolerated; prose or markdown around the JSON is a parse failure.
    pub fn parse(text: &str) -> DomainResult<Self> {
        serde_json::from_str(text.trim()).map_err(|e| DomainError::ClassificationParse(e.to_string()))
    }

    /// The routing discriminator, required for the first classification pass.
    pub fn discriminator(&self) -> DomainResult<&str> {
        match self.intent.as_deref().map(str::trim) {
            Some(intent) if !intent.is_empty() => Ok(intent),
            _ => Err(DomainError::ClassificationParse(
                "missing field `intent`".to_string(),
            )),
        }
    }
}

/// The coarse intent chosen by the routing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentKind {
    Chat,
    Summarize,
    CreateTask,
    CreateProject,
    Complete,
    Update,
    List,
    /// Discriminator the orchestrator does not know (kept verbatim).
    Unknown(String),
}

impl IntentKind {
    pub fn from_discriminator(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "chat" => Self::Chat,
            "summarize" | "summary" => Self::Summarize,
            "createtask" => Self::CreateTask,
            "createproject" => Self::CreateProject,
            "completetask" | "complete" => Self::Complete,
            "updateentity" | "update" | "updatetask" => Self::Update,
            "list" | "listentities" => Self::List,
            _ => Self::Unknown(raw.trim().to_string()),
        }
    }

    /// Name used for the `intent` field of responses.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Chat => "chat",
            Self::Summarize => "summarize",
            Self::CreateTask => "createTask",
            Self::CreateProject => "createProject",
            Self::Complete => "completeTask",
            Self::Update => "updateEntity",
            Self::List => "list",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Whether a second, intent-specific classification pass is needed.
    pub fn needs_details(&self) -> bool {
        !matches!(self, Self::Chat | Self::Unknown(_))
    }
}

/// What a complete/update/list/summary command points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetType {
    Task,
    Project,
    #[serde(rename = "nextAction")]
    Context,
}

impl TargetType {
    /// Parse a free-form entity type; empty input is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "task" | "tasks" | "todo" | "todos" => Some(Self::Task),
            "project" | "projects" => Some(Self::Project),
            "nextaction" | "nextactions" | "context" | "contexts" => Some(Self::Context),
            _ => None,
        }
    }

    /// An empty entity type means a task. `None` for a type this crate
    /// does not handle.
    fn from_envelope(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return Some(Self::Task);
        }
        Self::parse(raw)
    }
}

/// Fields a task needs at creation time, still carrying names instead of ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Option<i64>,
    pub category: String,
    pub project_name: String,
    pub context_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub tasks: Vec<TaskDraft>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryRequest {
    /// Free-form summary of the supplied context text.
    General { context: String },
    /// Completion progress of a named task, project or context.
    Progress { target: TargetType, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub target: TargetType,
    /// Task title, or the container name for project/context targets.
    pub name: String,
    /// Optional scope narrowing a task search.
    pub project_name: String,
    pub context_name: String,
}

/// A field the update template may name in `fieldsToUpdate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateField {
    Title,
    Description,
    DueDate,
    Priority,
    ProjectName,
    NextActionName,
}

impl UpdateField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "title" | "newtitle" | "name" => Some(Self::Title),
            "description" => Some(Self::Description),
            "duedate" => Some(Self::DueDate),
            "priority" => Some(Self::Priority),
            "projectname" | "project" => Some(Self::ProjectName),
            "nextactionname" | "nextaction" | "context" => Some(Self::NextActionName),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub target: TargetType,
    /// Name used to locate the record (task title, project or context name).
    pub lookup: String,
    pub fields: Vec<UpdateField>,
    pub new_title: String,
    pub description: String,
    pub due_date: String,
    pub priority: Option<i64>,
    pub project_name: String,
    pub context_name: String,
}

impl UpdateRequest {
    pub fn wants(&self, field: UpdateField) -> bool {
        self.fields.contains(&field)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub target: TargetType,
    pub query: String,
}

/// A fully classified command.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Chat,
    Summarize(SummaryRequest),
    CreateTask(TaskDraft),
    CreateProject(ProjectDraft),
    Complete(CompletionRequest),
    Update(UpdateRequest),
    List(ListRequest),
    Unknown(String),
}

impl Intent {
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Chat => IntentKind::Chat.as_str(),
            Self::Summarize(_) => IntentKind::Summarize.as_str(),
            Self::CreateTask(_) => IntentKind::CreateTask.as_str(),
            Self::CreateProject(_) => IntentKind::CreateProject.as_str(),
            Self::Complete(_) => IntentKind::Complete.as_str(),
            Self::Update(_) => IntentKind::Update.as_str(),
            Self::List(_) => IntentKind::List.as_str(),
            Self::Unknown(_) => "unknown",
        }
    }

    /// Validate an envelope into the variant for `kind`.
    pub fn from_envelope(kind: &IntentKind, envelope: IntentEnvelope) -> DomainResult<Self> {
        match kind {
            IntentKind::Chat => Ok(Self::Chat),
            IntentKind::Unknown(raw) => Ok(Self::Unknown(raw.clone())),
            IntentKind::Summarize => summary_from(envelope),
            IntentKind::CreateTask => {
                let draft = draft_from(&envelope);
                require("title", &draft.title)?;
                Ok(Self::CreateTask(draft))
            }
            IntentKind::CreateProject => {
                require("projectName", &envelope.project_name)?;
                let tasks = envelope
                    .tasks
                    .into_iter()
                    .map(|t| TaskDraft {
                        title: t.title,
                        description: t.description,
                        due_date: t.due_date,
                        priority: t.priority,
                        category: t.category,
                        project_name: String::new(),
                        context_name: t.next_action_name,
                    })
                    .collect();
                Ok(Self::CreateProject(ProjectDraft {
                    name: envelope.project_name.trim().to_string(),
                    description: envelope.project_description,
                    tasks,
                }))
            }
            IntentKind::Complete => {
                let Some(target) = TargetType::from_envelope(&envelope.entity_type) else {
                    return Ok(unknown_entity_type(kind, &envelope.entity_type));
                };
                let name = target_name(target, &envelope);
                require(target_field(target), &name)?;
                Ok(Self::Complete(CompletionRequest {
                    target,
                    name,
                    project_name: scope_name(target, TargetType::Project, &envelope.project_name),
                    context_name: scope_name(target, TargetType::Context, &envelope.next_action_name),
                }))
            }
            IntentKind::Update => {
                let Some(target) = TargetType::from_envelope(&envelope.entity_type) else {
                    return Ok(unknown_entity_type(kind, &envelope.entity_type));
                };
                let lookup = target_name(target, &envelope);
                require(target_field(target), &lookup)?;
                let mut fields = Vec::new();
                for raw in &envelope.fields_to_update {
                    match UpdateField::parse(raw) {
                        Some(field) if !fields.contains(&field) => fields.push(field),
                        Some(_) => {}
                        None => tracing::warn!(field = %raw, "ignoring unknown field in fieldsToUpdate"),
                    }
                }
                Ok(Self::Update(UpdateRequest {
                    target,
                    lookup,
                    fields,
                    new_title: envelope.new_title,
                    description: envelope.description,
                    due_date: envelope.due_date,
                    priority: envelope.priority,
                    project_name: envelope.project_name,
                    context_name: envelope.next_action_name,
                }))
            }
            IntentKind::List => {
                let Some(target) = TargetType::from_envelope(&envelope.entity_type) else {
                    return Ok(unknown_entity_type(kind, &envelope.entity_type));
                };
                Ok(Self::List(ListRequest {
                    target,
                    query: envelope.query.trim().to_string(),
                }))
            }
        }
    }
}

fn require(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::ClassificationParse(format!(
            "missing required field `{field}`"
        )));
    }
    Ok(())
}

fn draft_from(envelope: &IntentEnvelope) -> TaskDraft {
    TaskDraft {
        title: envelope.title.trim().to_string(),
        description: envelope.description.clone(),
        due_date: envelope.due_date.clone(),
        priority: envelope.priority,
        category: envelope.category.clone(),
        project_name: envelope.project_name.trim().to_string(),
        context_name: envelope.next_action_name.trim().to_string(),
    }
}

fn summary_from(envelope: IntentEnvelope) -> DomainResult<Intent> {
    if envelope.entity_type.trim().is_empty() {
        let context = if envelope.context.trim().is_empty() {
            envelope.user_prompt
        } else {
            envelope.context
        };
        require("context", &context)?;
        return Ok(Intent::Summarize(SummaryRequest::General { context }));
    }
    let Some(target) = TargetType::from_envelope(&envelope.entity_type) else {
        return Ok(unknown_entity_type(&IntentKind::Summarize, &envelope.entity_type));
    };
    let name = target_name(target, &envelope);
    require(target_field(target), &name)?;
    Ok(Intent::Summarize(SummaryRequest::Progress { target, name }))
}

/// An entity type outside task/project/nextAction is a discriminator the
/// orchestrator cannot act on, not malformed output.
fn unknown_entity_type(kind: &IntentKind, raw: &str) -> Intent {
    let raw = raw.trim();
    tracing::warn!(intent = kind.as_str(), entity_type = raw, "unknown entityType");
    Intent::Unknown(format!("{}/{raw}", kind.as_str()))
}

/// The name a target is looked up by. Container names fall back to `title`
/// because templates are not always consistent about which field they fill.
fn target_name(target: TargetType, envelope: &IntentEnvelope) -> String {
    let primary = match target {
        TargetType::Task => &envelope.title,
        TargetType::Project => &envelope.project_name,
        TargetType::Context => &envelope.next_action_name,
    };
    let name = if primary.trim().is_empty() { &envelope.title } else { primary };
    name.trim().to_string()
}

fn target_field(target: TargetType) -> &'static str {
    match target {
        TargetType::Task => "title",
        TargetType::Project => "projectName",
        TargetType::Context => "nextActionName",
    }
}

/// A scope name only narrows a task search; for container targets it is the
/// target itself and must not be applied twice.
fn scope_name(target: TargetType, scope: TargetType, raw: &str) -> String {
    if target == TargetType::Task && scope != TargetType::Task {
        raw.trim().to_string()
    } else {
        String::new()
    }
}
