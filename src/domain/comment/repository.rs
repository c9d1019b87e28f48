//! Comment repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{Comment, CommentId, NewComment};
use crate::domain::issue::IssueId;
use crate::domain::DomainError;

/// Repository for comments
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn get(&self, id: CommentId) -> Result<Option<Comment>, DomainError>;

    /// List the comments of an issue, oldest first
    async fn list_by_issue(&self, issue: IssueId) -> Result<Vec<Comment>, DomainError>;

    /// Persist a comment. Fails with `NotFound` when the issue or the author
    /// contributor record does not exist.
    async fn create(&self, comment: NewComment) -> Result<Comment, DomainError>;

    /// Update the description. Issue and author are never written.
    async fn update(&self, comment: &Comment) -> Result<Comment, DomainError>;

    async fn delete(&self, id: CommentId) -> Result<bool, DomainError>;
}
