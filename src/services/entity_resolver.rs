//! Name resolution for projects and contexts.
//!
//! Lookup order is exact (case-insensitive), then fuzzy over every record of
//! the kind the user owns, then optionally create-on-miss. Two concurrent
//! misses for the same name can both create a record; that race is accepted.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Context, EntityKind, Project, UserId};
use crate::domain::ports::{ContextRepository, ProjectRepository};
use crate::services::similarity::{best_match, FUZZY_MATCH_THRESHOLD};

/// A project or context found by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Project(Project),
    Context(Context),
}

impl Resolved {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Project(p) => p.id,
            Self::Context(c) => c.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Project(p) => &p.name,
            Self::Context(c) => &c.name,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Project(_) => EntityKind::Project,
            Self::Context(_) => EntityKind::Context,
        }
    }

    pub fn into_project(self) -> Option<Project> {
        match self {
            Self::Project(p) => Some(p),
            Self::Context(_) => None,
        }
    }

    pub fn into_context(self) -> Option<Context> {
        match self {
            Self::Context(c) => Some(c),
            Self::Project(_) => None,
        }
    }
}

/// Outcome of [`EntityResolver::resolve_by_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No name was given.
    None,
    Existing(Resolved),
    Created(Resolved),
}

impl Resolution {
    pub fn id(&self) -> Option<Uuid> {
        self.resolved().map(Resolved::id)
    }

    pub fn resolved(&self) -> Option<&Resolved> {
        match self {
            Self::None => None,
            Self::Existing(r) | Self::Created(r) => Some(r),
        }
    }

    pub fn into_resolved(self) -> Option<Resolved> {
        match self {
            Self::None => None,
            Self::Existing(r) | Self::Created(r) => Some(r),
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

pub struct EntityResolver<P: ProjectRepository, C: ContextRepository> {
    project_repo: Arc<P>,
    context_repo: Arc<C>,
}

impl<P: ProjectRepository, C: ContextRepository> EntityResolver<P, C> {
    pub fn new(project_repo: Arc<P>, context_repo: Arc<C>) -> Self {
        Self {
            project_repo,
            context_repo,
        }
    }

    /// Resolve `name`, creating a record when nothing matches.
    pub async fn resolve_by_name(&self, kind: EntityKind, name: &str, owner: UserId) -> DomainResult<Resolution> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Resolution::None);
        }
        if let Some(found) = self.find_by_name(kind, name, owner).await? {
            return Ok(Resolution::Existing(found));
        }

        let created = match kind {
            EntityKind::Project => {
                let project = Project::new(owner, name, None);
                self.project_repo.create(&project).await?;
                Resolved::Project(project)
            }
            EntityKind::Context => {
                let context = Context::new(owner, name);
                self.context_repo.create(&context).await?;
                Resolved::Context(context)
            }
        };
        tracing::info!(
            user_id = %owner,
            kind = kind.as_str(),
            id = %created.id(),
            name = name,
            "created on resolution miss"
        );
        Ok(Resolution::Created(created))
    }

    /// Resolve `name` without creating anything.
    pub async fn find_by_name(&self, kind: EntityKind, name: &str, owner: UserId) -> DomainResult<Option<Resolved>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let found = match kind {
            EntityKind::Project => {
                let projects = self.project_repo.list_for_user(owner).await?;
                match_name(name, &projects, |p| p.name.as_str()).map(|p| Resolved::Project(p.clone()))
            }
            EntityKind::Context => {
                let contexts = self.context_repo.list_for_user(owner).await?;
                match_name(name, &contexts, |c| c.name.as_str()).map(|c| Resolved::Context(c.clone()))
            }
        };

        if found.is_none() {
            tracing::debug!(user_id = %owner, kind = kind.as_str(), name = name, "no record matched");
        }
        Ok(found)
    }

    pub async fn find_project(&self, name: &str, owner: UserId) -> DomainResult<Option<Project>> {
        Ok(self
            .find_by_name(EntityKind::Project, name, owner)
            .await?
            .and_then(Resolved::into_project))
    }

    pub async fn find_context(&self, name: &str, owner: UserId) -> DomainResult<Option<Context>> {
        Ok(self
            .find_by_name(EntityKind::Context, name, owner)
            .await?
            .and_then(Resolved::into_context))
    }
}

/// Exact case-insensitive match first, then the best fuzzy candidate.
fn match_name<'a, T>(name: &str, records: &'a [T], name_of: impl Fn(&T) -> &str) -> Option<&'a T> {
    let wanted = name.to_lowercase();
    if let Some(exact) = records.iter().find(|r| name_of(*r).trim().to_lowercase() == wanted) {
        return Some(exact);
    }

    let (record, score) = best_match(name, records, &name_of, FUZZY_MATCH_THRESHOLD)?;
    tracing::debug!(query = name, matched = name_of(record), score, "fuzzy name match");
    Some(record)
}
