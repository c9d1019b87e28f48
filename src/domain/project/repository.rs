//! Project repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{NewProject, Project, ProjectId};
use crate::domain::contributor::Contributor;
use crate::domain::DomainError;

/// Repository for projects
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Get a project by ID
    async fn get(&self, id: ProjectId) -> Result<Option<Project>, DomainError>;

    /// List all projects ordered by ID
    async fn list(&self) -> Result<Vec<Project>, DomainError>;

    /// Persist a project and its author's contributor row as one atomic unit.
    /// Either both rows become visible or neither does.
    async fn create_with_author(
        &self,
        project: NewProject,
    ) -> Result<(Project, Contributor), DomainError>;

    /// Update title, description and type. The author column is never written.
    async fn update(&self, project: &Project) -> Result<Project, DomainError>;

    /// Delete a project, cascading to its contributors, issues and comments
    async fn delete(&self, id: ProjectId) -> Result<bool, DomainError>;

    /// Check if a project exists
    async fn exists(&self, id: ProjectId) -> Result<bool, DomainError>;
}
