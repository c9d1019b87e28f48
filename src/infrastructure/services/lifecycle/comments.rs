//! Comment operations

use tracing::info;

use super::{enforce, Deletion, ResourceLifecycleManager};
use crate::domain::comment::{Comment, CommentId, NewComment};
use crate::domain::issue::IssueId;
use crate::domain::project::ProjectId;
use crate::domain::{Action, Actor, DomainError, Resource};

#[derive(Debug, Clone)]
pub struct CreateCommentRequest {
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCommentRequest {
    pub description: Option<String>,
}

impl ResourceLifecycleManager {
    /// Comment on an issue. The author is the actor's membership record in
    /// the issue's project; non-members are refused.
    pub async fn create_comment(
        &self,
        actor: Actor,
        project_id: ProjectId,
        issue_id: IssueId,
        request: CreateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let user = actor.require_user()?;
        let project = self.load_project(project_id).await?;
        let issue = self.load_issue(&project, issue_id).await?;

        let Some(membership) = self.ledger.membership(user, project.id()).await? else {
            return Err(DomainError::precondition_failed(
                "You must be a contributor of this project to comment",
            ));
        };

        let new = NewComment::new(request.description, issue.id(), membership.id())?;
        let comment = self.repos.comments.create(new).await?;
        info!(
            comment_id = %comment.id(),
            issue_id = %issue_id,
            contributor_id = %membership.id(),
            "Comment created"
        );

        Ok(comment)
    }

    pub async fn list_comments(
        &self,
        _actor: Actor,
        project_id: ProjectId,
        issue_id: IssueId,
    ) -> Result<Vec<Comment>, DomainError> {
        let project = self.load_project(project_id).await?;
        let issue = self.load_issue(&project, issue_id).await?;
        self.repos.comments.list_by_issue(issue.id()).await
    }

    pub async fn get_comment(
        &self,
        _actor: Actor,
        project_id: ProjectId,
        issue_id: IssueId,
        id: CommentId,
    ) -> Result<Comment, DomainError> {
        let project = self.load_project(project_id).await?;
        let issue = self.load_issue(&project, issue_id).await?;
        self.load_comment(&issue, id).await
    }

    pub async fn update_comment(
        &self,
        actor: Actor,
        project_id: ProjectId,
        issue_id: IssueId,
        id: CommentId,
        request: UpdateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let project = self.load_project(project_id).await?;
        let issue = self.load_issue(&project, issue_id).await?;
        let mut comment = self.load_comment(&issue, id).await?;
        let author = self.comment_author(&comment).await?;
        enforce(
            actor,
            Action::Update,
            &Resource::Comment {
                comment: &comment,
                author: &author,
                project: &project,
            },
        )?;

        if let Some(description) = request.description {
            comment.set_description(description)?;
        }

        let comment = self.repos.comments.update(&comment).await?;
        info!(comment_id = %id, issue_id = %issue_id, "Comment updated");

        Ok(comment)
    }

    pub async fn delete_comment(
        &self,
        actor: Actor,
        project_id: ProjectId,
        issue_id: IssueId,
        id: CommentId,
    ) -> Result<Deletion<CommentId>, DomainError> {
        let project = self.load_project(project_id).await?;
        let issue = self.load_issue(&project, issue_id).await?;
        let comment = self.load_comment(&issue, id).await?;
        let author = self.comment_author(&comment).await?;
        enforce(
            actor,
            Action::Delete,
            &Resource::Comment {
                comment: &comment,
                author: &author,
                project: &project,
            },
        )?;

        if !self.repos.comments.delete(id).await? {
            return Err(DomainError::not_found(format!("Comment '{}' not found", id)));
        }
        info!(comment_id = %id, issue_id = %issue_id, "Comment deleted");

        Ok(Deletion::of(id))
    }
}
