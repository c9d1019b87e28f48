//! Contributor operations

use tracing::info;

use super::{enforce, Deletion, ResourceLifecycleManager};
use crate::domain::contributor::{Contributor, ContributorId};
use crate::domain::project::{Project, ProjectId};
use crate::domain::user::UserId;
use crate::domain::{Action, Actor, DomainError, Resource};

impl ResourceLifecycleManager {
    /// Add `user` to a project. Only the project author may do so.
    pub async fn add_contributor(
        &self,
        actor: Actor,
        project_id: ProjectId,
        user: UserId,
    ) -> Result<Contributor, DomainError> {
        let project = self.load_project(project_id).await?;
        enforce(actor, Action::Create, &Resource::Contributor { project: &project })?;

        if !self.repos.users.exists(user).await? {
            return Err(DomainError::not_found(format!("User '{}' not found", user)));
        }

        self.ledger.add(user, project.id()).await
    }

    pub async fn list_contributors(
        &self,
        _actor: Actor,
        project_id: ProjectId,
    ) -> Result<Vec<Contributor>, DomainError> {
        let project = self.load_project(project_id).await?;
        self.ledger.list_contributors(project.id()).await
    }

    pub async fn get_contributor(
        &self,
        actor: Actor,
        project_id: ProjectId,
        id: ContributorId,
    ) -> Result<Contributor, DomainError> {
        let project = self.load_project(project_id).await?;
        let contributor = self.load_contributor(&project, id).await?;
        enforce(actor, Action::Read, &Resource::Contributor { project: &project })?;
        Ok(contributor)
    }

    /// Remove a membership. The author's own membership is permanent.
    pub async fn remove_contributor(
        &self,
        actor: Actor,
        project_id: ProjectId,
        id: ContributorId,
    ) -> Result<Deletion<ContributorId>, DomainError> {
        let project = self.load_project(project_id).await?;
        let contributor = self.load_contributor(&project, id).await?;
        enforce(actor, Action::Delete, &Resource::Contributor { project: &project })?;

        if contributor.user() == project.author() {
            return Err(DomainError::validation(
                "The project author cannot be removed from its contributors",
            ));
        }

        if !self.ledger.remove(contributor.user(), project.id()).await? {
            return Err(DomainError::not_found(format!("Contributor '{}' not found", id)));
        }
        info!(project_id = %project_id, contributor_id = %id, "Contributor removed");

        Ok(Deletion::of(id))
    }

    async fn load_contributor(
        &self,
        project: &Project,
        id: ContributorId,
    ) -> Result<Contributor, DomainError> {
        self.repos
            .contributors
            .get(id)
            .await?
            .filter(|contributor| contributor.project() == project.id())
            .ok_or_else(|| DomainError::not_found(format!("Contributor '{}' not found", id)))
    }
}
