//! Issue operations

use tracing::info;

use super::{enforce, Deletion, ResourceLifecycleManager};
use crate::domain::issue::{Issue, IssueId, IssuePriority, IssueStatus, IssueTag, NewIssue};
use crate::domain::project::{Project, ProjectId};
use crate::domain::user::UserId;
use crate::domain::{Action, Actor, DomainError, Resource};

/// Request to file an issue; unset classifications take their defaults
#[derive(Debug, Clone, Default)]
pub struct CreateIssueRequest {
    pub title: String,
    pub description: String,
    pub assignee: Option<UserId>,
    pub priority: Option<IssuePriority>,
    pub tag: Option<IssueTag>,
    pub status: Option<IssueStatus>,
}

impl CreateIssueRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

/// Request to update an issue.
/// `assignee: Some(None)` clears the assignee.
#[derive(Debug, Clone, Default)]
pub struct UpdateIssueRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<Option<UserId>>,
    pub priority: Option<IssuePriority>,
    pub tag: Option<IssueTag>,
    pub status: Option<IssueStatus>,
}

impl ResourceLifecycleManager {
    /// File an issue. The actor must contribute to the project and becomes
    /// the issue author.
    pub async fn create_issue(
        &self,
        actor: Actor,
        project_id: ProjectId,
        request: CreateIssueRequest,
    ) -> Result<Issue, DomainError> {
        let author = actor.require_user()?;
        let project = self.load_project(project_id).await?;

        if !self.ledger.is_member(author, project.id()).await? {
            return Err(DomainError::precondition_failed(
                "You must be a contributor of this project to create an issue",
            ));
        }
        self.check_assignee(&project, request.assignee).await?;

        let new = NewIssue::new(request.title, request.description, project.id(), author)?
            .with_assignee(request.assignee)
            .with_priority(request.priority.unwrap_or_default())
            .with_tag(request.tag.unwrap_or_default())
            .with_status(request.status.unwrap_or_default());

        let issue = self.repos.issues.create(new).await?;
        info!(
            issue_id = %issue.id(),
            project_id = %project_id,
            author_id = %author,
            "Issue created"
        );

        Ok(issue)
    }

    pub async fn list_issues(
        &self,
        _actor: Actor,
        project_id: ProjectId,
    ) -> Result<Vec<Issue>, DomainError> {
        let project = self.load_project(project_id).await?;
        self.repos.issues.list_by_project(project.id()).await
    }

    pub async fn get_issue(
        &self,
        actor: Actor,
        project_id: ProjectId,
        id: IssueId,
    ) -> Result<Issue, DomainError> {
        let project = self.load_project(project_id).await?;
        let issue = self.load_issue(&project, id).await?;
        enforce(
            actor,
            Action::Read,
            &Resource::Issue {
                issue: &issue,
                project: &project,
            },
        )?;
        Ok(issue)
    }

    pub async fn update_issue(
        &self,
        actor: Actor,
        project_id: ProjectId,
        id: IssueId,
        request: UpdateIssueRequest,
    ) -> Result<Issue, DomainError> {
        let project = self.load_project(project_id).await?;
        let mut issue = self.load_issue(&project, id).await?;
        enforce(
            actor,
            Action::Update,
            &Resource::Issue {
                issue: &issue,
                project: &project,
            },
        )?;

        if let Some(assignee) = request.assignee {
            self.check_assignee(&project, assignee).await?;
            issue.set_assignee(assignee);
        }
        if let Some(title) = request.title {
            issue.set_title(title)?;
        }
        if let Some(description) = request.description {
            issue.set_description(description)?;
        }
        if let Some(priority) = request.priority {
            issue.set_priority(priority);
        }
        if let Some(tag) = request.tag {
            issue.set_tag(tag);
        }
        if let Some(status) = request.status {
            issue.set_status(status);
        }

        let issue = self.repos.issues.update(&issue).await?;
        info!(issue_id = %id, project_id = %project_id, "Issue updated");

        Ok(issue)
    }

    /// Delete an issue and its comments
    pub async fn delete_issue(
        &self,
        actor: Actor,
        project_id: ProjectId,
        id: IssueId,
    ) -> Result<Deletion<IssueId>, DomainError> {
        let project = self.load_project(project_id).await?;
        let issue = self.load_issue(&project, id).await?;
        enforce(
            actor,
            Action::Delete,
            &Resource::Issue {
                issue: &issue,
                project: &project,
            },
        )?;

        if !self.repos.issues.delete(id).await? {
            return Err(DomainError::not_found(format!("Issue '{}' not found", id)));
        }
        info!(issue_id = %id, project_id = %project_id, "Issue deleted");

        Ok(Deletion::of(id))
    }

    /// An assignee must currently contribute to the project
    async fn check_assignee(
        &self,
        project: &Project,
        assignee: Option<UserId>,
    ) -> Result<(), DomainError> {
        let Some(assignee) = assignee else {
            return Ok(());
        };

        if self.ledger.is_member(assignee, project.id()).await? {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "User '{}' is not a contributor of this project and cannot be assigned",
                assignee
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{manager, user};
    use super::super::CreateProjectRequest;
    use super::*;
    use crate::domain::project::ProjectType;
    use crate::domain::user::User;
    use crate::infrastructure::storage::Repositories;

    struct World {
        manager: ResourceLifecycleManager,
        repos: Repositories,
        alice: User,
        bob: User,
        carol: User,
        project: Project,
    }

    /// Alice owns "Website", Bob contributes, Carol is an outsider
    async fn world() -> World {
        let (manager, repos) = manager();
        let alice = user(&repos, "alice").await;
        let bob = user(&repos, "bob").await;
        let carol = user(&repos, "carol").await;
        let project = manager
            .create_project(
                Actor::User(alice.id()),
                CreateProjectRequest {
                    title: "Website".to_string(),
                    description: "Company site".to_string(),
                    project_type: ProjectType::Frontend,
                },
            )
            .await
            .unwrap();
        manager
            .add_contributor(Actor::User(alice.id()), project.id(), bob.id())
            .await
            .unwrap();

        World {
            manager,
            repos,
            alice,
            bob,
            carol,
            project,
        }
    }

    #[tokio::test]
    async fn test_member_creates_with_defaults_and_stamped_author() {
        let w = world().await;

        let issue = w
            .manager
            .create_issue(
                Actor::User(w.bob.id()),
                w.project.id(),
                CreateIssueRequest::new("Fix footer", "Links are broken"),
            )
            .await
            .unwrap();

        assert_eq!(issue.author(), w.bob.id());
        assert_eq!(issue.project(), w.project.id());
        assert_eq!(issue.priority(), IssuePriority::Low);
        assert_eq!(issue.tag(), IssueTag::Task);
        assert_eq!(issue.status(), IssueStatus::Todo);
    }

    #[tokio::test]
    async fn test_non_member_precondition_failed() {
        let w = world().await;

        let err = w
            .manager
            .create_issue(
                Actor::User(w.carol.id()),
                w.project.id(),
                CreateIssueRequest::new("Spam", "Outsider"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::PreconditionFailed { .. }));
        assert!(w
            .manager
            .list_issues(Actor::Anonymous, w.project.id())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_assignee_must_be_member() {
        let w = world().await;

        let err = w
            .manager
            .create_issue(
                Actor::User(w.bob.id()),
                w.project.id(),
                CreateIssueRequest {
                    assignee: Some(w.carol.id()),
                    ..CreateIssueRequest::new("Fix footer", "Links")
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let issue = w
            .manager
            .create_issue(
                Actor::User(w.bob.id()),
                w.project.id(),
                CreateIssueRequest {
                    assignee: Some(w.alice.id()),
                    ..CreateIssueRequest::new("Fix footer", "Links")
                },
            )
            .await
            .unwrap();
        assert_eq!(issue.assignee(), Some(w.alice.id()));

        let err = w
            .manager
            .update_issue(
                Actor::User(w.bob.id()),
                w.project.id(),
                issue.id(),
                UpdateIssueRequest {
                    assignee: Some(Some(w.carol.id())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_clear_assignee() {
        let w = world().await;
        let issue = w
            .manager
            .create_issue(
                Actor::User(w.alice.id()),
                w.project.id(),
                CreateIssueRequest {
                    assignee: Some(w.bob.id()),
                    ..CreateIssueRequest::new("Fix footer", "Links")
                },
            )
            .await
            .unwrap();

        let updated = w
            .manager
            .update_issue(
                Actor::User(w.alice.id()),
                w.project.id(),
                issue.id(),
                UpdateIssueRequest {
                    assignee: Some(None),
                    status: Some(IssueStatus::Finished),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.assignee().is_none());
        assert_eq!(updated.status(), IssueStatus::Finished);
    }

    #[tokio::test]
    async fn test_issue_under_wrong_project_not_found() {
        let w = world().await;
        let other = w
            .manager
            .create_project(
                Actor::User(w.alice.id()),
                CreateProjectRequest {
                    title: "App".to_string(),
                    description: "Mobile".to_string(),
                    project_type: ProjectType::Ios,
                },
            )
            .await
            .unwrap();
        let issue = w
            .manager
            .create_issue(
                Actor::User(w.alice.id()),
                w.project.id(),
                CreateIssueRequest::new("Fix footer", "Links"),
            )
            .await
            .unwrap();

        let err = w
            .manager
            .get_issue(Actor::Anonymous, other.id(), issue.id())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = w
            .manager
            .delete_issue(Actor::User(w.alice.id()), other.id(), issue.id())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_by_issue_author_or_project_author_only() {
        let w = world().await;
        let bobs = w
            .manager
            .create_issue(
                Actor::User(w.bob.id()),
                w.project.id(),
                CreateIssueRequest::new("Fix footer", "Links"),
            )
            .await
            .unwrap();
        let alices = w
            .manager
            .create_issue(
                Actor::User(w.alice.id()),
                w.project.id(),
                CreateIssueRequest::new("Header", "Logo"),
            )
            .await
            .unwrap();

        let err = w
            .manager
            .delete_issue(Actor::User(w.bob.id()), w.project.id(), alices.id())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));

        let deletion = w
            .manager
            .delete_issue(Actor::User(w.alice.id()), w.project.id(), bobs.id())
            .await
            .unwrap();
        assert_eq!(deletion, Deletion::of(bobs.id()));
        assert!(w.repos.issues.get(bobs.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_assignee_account_clears_assignment() {
        let w = world().await;
        let issue = w
            .manager
            .create_issue(
                Actor::User(w.alice.id()),
                w.project.id(),
                CreateIssueRequest {
                    assignee: Some(w.bob.id()),
                    ..CreateIssueRequest::new("Fix footer", "Links")
                },
            )
            .await
            .unwrap();

        w.repos.users.delete(w.bob.id()).await.unwrap();

        let issue = w
            .manager
            .get_issue(Actor::Anonymous, w.project.id(), issue.id())
            .await
            .unwrap();
        assert!(issue.assignee().is_none());
    }
}
