//! Issue repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{Issue, IssueId, NewIssue};
use crate::domain::project::ProjectId;
use crate::domain::DomainError;

/// Repository for issues
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Get an issue by ID
    async fn get(&self, id: IssueId) -> Result<Option<Issue>, DomainError>;

    /// List the issues of a project ordered by ID
    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Issue>, DomainError>;

    /// Create an issue, assigning its ID. Fails with `NotFound` when the
    /// project does not exist.
    async fn create(&self, issue: NewIssue) -> Result<Issue, DomainError>;

    /// Update mutable fields. Project and author columns are never written.
    async fn update(&self, issue: &Issue) -> Result<Issue, DomainError>;

    /// Delete an issue and its comments
    async fn delete(&self, id: IssueId) -> Result<bool, DomainError>;
}
