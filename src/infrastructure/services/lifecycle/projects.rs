//! Project operations

use tracing::info;

use super::{enforce, Deletion, ResourceLifecycleManager};
use crate::domain::project::{NewProject, Project, ProjectId, ProjectType};
use crate::domain::{Action, Actor, DomainError, Resource};
use crate::infrastructure::observability::record_membership_change;

/// Request to create a project; the author is always the caller
#[derive(Debug, Clone)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    pub project_type: ProjectType,
}

/// Request to update a project
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_type: Option<ProjectType>,
}

impl ResourceLifecycleManager {
    /// Create a project authored by the actor, who becomes its first
    /// contributor in the same atomic write
    pub async fn create_project(
        &self,
        actor: Actor,
        request: CreateProjectRequest,
    ) -> Result<Project, DomainError> {
        let author = actor.require_user()?;
        let new = NewProject::new(
            request.title,
            request.description,
            request.project_type,
            author,
        )?;

        let (project, contributor) = self.repos.projects.create_with_author(new).await?;
        record_membership_change("add", "added");

        info!(
            project_id = %project.id(),
            author_id = %author,
            contributor_id = %contributor.id(),
            "Project created"
        );

        Ok(project)
    }

    pub async fn get_project(&self, actor: Actor, id: ProjectId) -> Result<Project, DomainError> {
        let project = self.load_project(id).await?;
        enforce(actor, Action::Read, &Resource::Project(&project))?;
        Ok(project)
    }

    pub async fn list_projects(&self, _actor: Actor) -> Result<Vec<Project>, DomainError> {
        self.repos.projects.list().await
    }

    pub async fn update_project(
        &self,
        actor: Actor,
        id: ProjectId,
        request: UpdateProjectRequest,
    ) -> Result<Project, DomainError> {
        let mut project = self.load_project(id).await?;
        enforce(actor, Action::Update, &Resource::Project(&project))?;

        if let Some(title) = request.title {
            project.set_title(title)?;
        }
        if let Some(description) = request.description {
            project.set_description(description)?;
        }
        if let Some(project_type) = request.project_type {
            project.set_project_type(project_type);
        }

        let project = self.repos.projects.update(&project).await?;
        info!(project_id = %id, "Project updated");

        Ok(project)
    }

    /// Delete a project with its contributors, issues and comments
    pub async fn delete_project(
        &self,
        actor: Actor,
        id: ProjectId,
    ) -> Result<Deletion<ProjectId>, DomainError> {
        let project = self.load_project(id).await?;
        enforce(actor, Action::Delete, &Resource::Project(&project))?;

        if !self.repos.projects.delete(id).await? {
            return Err(DomainError::not_found(format!("Project '{}' not found", id)));
        }
        info!(project_id = %id, "Project deleted");

        Ok(Deletion::of(id))
    }
}
