//! Resource lifecycle manager
//!
//! Orchestrates reads and writes of projects, contributors, issues and
//! comments. Every operation takes the acting identity explicitly, resolves
//! the records the policy needs, enforces membership preconditions and
//! stamps ownership fields before anything reaches a repository.

mod comments;
mod contributors;
mod issues;
mod projects;

use serde::Serialize;
use tracing::debug;

use crate::domain::comment::{Comment, CommentId};
use crate::domain::contributor::Contributor;
use crate::domain::issue::{Issue, IssueId};
use crate::domain::project::{Project, ProjectId};
use crate::domain::{ensure_allowed, Action, Actor, DomainError, Resource};
use crate::infrastructure::observability::record_authorization;
use crate::infrastructure::storage::Repositories;

use super::membership_ledger::MembershipLedger;

pub use comments::{CreateCommentRequest, UpdateCommentRequest};
pub use issues::{CreateIssueRequest, UpdateIssueRequest};
pub use projects::{CreateProjectRequest, UpdateProjectRequest};

/// Confirmation returned by every delete operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deletion<I> {
    pub deleted: bool,
    pub id: I,
}

impl<I> Deletion<I> {
    pub fn of(id: I) -> Self {
        Self { deleted: true, id }
    }
}

/// Enforce the write policy, recording the decision
pub(crate) fn enforce(
    actor: Actor,
    action: Action,
    resource: &Resource<'_>,
) -> Result<(), DomainError> {
    let result = ensure_allowed(actor, action, resource);
    let decision = if result.is_ok() { "allow" } else { "deny" };

    if action.is_write() {
        record_authorization(resource.kind(), action.as_str(), decision);
    }
    if result.is_err() {
        debug!(
            actor = ?actor.user_id(),
            action = action.as_str(),
            resource = resource.kind(),
            "Write denied by policy"
        );
    }

    result
}

/// Orchestrates resource creation, mutation and removal
#[derive(Clone)]
pub struct ResourceLifecycleManager {
    repos: Repositories,
    ledger: MembershipLedger,
}

impl std::fmt::Debug for ResourceLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLifecycleManager")
            .field("repos", &self.repos)
            .finish_non_exhaustive()
    }
}

impl ResourceLifecycleManager {
    pub fn new(repos: Repositories) -> Self {
        let ledger = MembershipLedger::new(repos.contributors.clone());
        Self { repos, ledger }
    }

    pub fn ledger(&self) -> &MembershipLedger {
        &self.ledger
    }

    async fn load_project(&self, id: ProjectId) -> Result<Project, DomainError> {
        self.repos
            .projects
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Project '{}' not found", id)))
    }

    /// Load an issue, treating one filed under another project as absent
    async fn load_issue(&self, project: &Project, id: IssueId) -> Result<Issue, DomainError> {
        self.repos
            .issues
            .get(id)
            .await?
            .filter(|issue| issue.project() == project.id())
            .ok_or_else(|| DomainError::not_found(format!("Issue '{}' not found", id)))
    }

    /// Load a comment, treating one attached to another issue as absent
    async fn load_comment(&self, issue: &Issue, id: CommentId) -> Result<Comment, DomainError> {
        self.repos
            .comments
            .get(id)
            .await?
            .filter(|comment| comment.issue() == issue.id())
            .ok_or_else(|| DomainError::not_found(format!("Comment '{}' not found", id)))
    }

    /// The contributor record a comment was written through
    async fn comment_author(&self, comment: &Comment) -> Result<Contributor, DomainError> {
        self.repos
            .contributors
            .get(comment.author())
            .await?
            .ok_or_else(|| {
                DomainError::internal(format!("Author of comment '{}' is missing", comment.id()))
            })
    }
}
