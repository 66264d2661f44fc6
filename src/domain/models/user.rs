//! Caller identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Opaque identity key that scopes every project, context and task.
///
/// Identity verification happens upstream; by the time a command reaches the
/// orchestrator the caller is represented by this key alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a caller-supplied identity. Anything unusable is `Unauthorized`.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Unauthorized);
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| DomainError::Unauthorized)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
