//! Domain errors for the taskpilot command pipeline.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur while handling a command.
///
/// Resolution misses and ambiguous matches are deliberately absent: the
/// orchestrator turns those into informational responses instead of errors.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Completion service error: {0}")]
    Upstream(String),

    #[error("Completion service returned no choices")]
    EmptyResponse,

    #[error("AI response did not match the expected format: {0}")]
    ClassificationParse(String),

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    #[error("Context not found: {0}")]
    ContextNotFound(Uuid),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Request deadline of {0}s exceeded")]
    DeadlineExceeded(u64),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Message safe to hand to the transport layer.
    ///
    /// Only classification failures are passed through verbatim; they point at
    /// a template/model mismatch worth diagnosing. Everything else is opaque.
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized => "unauthorized".to_string(),
            Self::Upstream(_) | Self::EmptyResponse => {
                "the assistant is temporarily unavailable".to_string()
            }
            Self::ClassificationParse(_) => self.to_string(),
            Self::TaskNotFound(_) => "task not found".to_string(),
            Self::ProjectNotFound(_) => "project not found".to_string(),
            Self::ContextNotFound(_) => "next action not found".to_string(),
            Self::DeadlineExceeded(_) => "request timed out".to_string(),
            Self::ValidationFailed(_) | Self::DatabaseError(_) | Self::SerializationError(_) => {
                "internal error".to_string()
            }
        }
    }

    /// Whether the failure came from the completion service.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::EmptyResponse)
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
