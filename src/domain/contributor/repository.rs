//! Contributor repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{Contributor, ContributorId};
use crate::domain::project::ProjectId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Storage for membership rows
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContributorRepository: Send + Sync {
    /// Insert a membership row.
    ///
    /// Uniqueness of (user, project) is enforced by the store itself and
    /// reported as `DomainError::DuplicateMembership`; an unknown project is
    /// reported as `DomainError::NotFound`.
    async fn insert(&self, user: UserId, project: ProjectId) -> Result<Contributor, DomainError>;

    /// Get a membership row by its ID
    async fn get(&self, id: ContributorId) -> Result<Option<Contributor>, DomainError>;

    /// Find the membership row linking a user to a project
    async fn find(
        &self,
        user: UserId,
        project: ProjectId,
    ) -> Result<Option<Contributor>, DomainError>;

    /// Delete the membership row linking a user to a project
    async fn delete(&self, user: UserId, project: ProjectId) -> Result<bool, DomainError>;

    /// List memberships of a project ordered by ID
    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Contributor>, DomainError>;
}
