//! PostgreSQL comment repository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::map_sqlx_error;
use crate::domain::comment::{Comment, CommentId, CommentRepository, NewComment};
use crate::domain::contributor::ContributorId;
use crate::domain::issue::IssueId;
use crate::domain::DomainError;

/// PostgreSQL implementation of CommentRepository
#[derive(Debug, Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn get(&self, id: CommentId) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query(
            "SELECT id, description, issue_id, author_id, created_time FROM comments WHERE id = $1",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "get comment"))?;

        Ok(row.as_ref().map(row_to_comment))
    }

    async fn list_by_issue(&self, issue: IssueId) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, issue_id, author_id, created_time
            FROM comments
            WHERE issue_id = $1
            ORDER BY created_time, id
            "#,
        )
        .bind(issue.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "list comments"))?;

        Ok(rows.iter().map(row_to_comment).collect())
    }

    async fn create(&self, comment: NewComment) -> Result<Comment, DomainError> {
        let comment = Comment::create(comment);

        sqlx::query(
            r#"
            INSERT INTO comments (id, description, issue_id, author_id, created_time)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id().value())
        .bind(comment.description())
        .bind(comment.issue().value())
        .bind(comment.author().value())
        .bind(comment.created_time())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "create comment"))?;

        Ok(comment)
    }

    async fn update(&self, comment: &Comment) -> Result<Comment, DomainError> {
        let result = sqlx::query("UPDATE comments SET description = $2 WHERE id = $1")
            .bind(comment.id().value())
            .bind(comment.description())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "update comment"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Comment '{}' not found",
                comment.id()
            )));
        }

        Ok(comment.clone())
    }

    async fn delete(&self, id: CommentId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "delete comment"))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_comment(row: &PgRow) -> Comment {
    Comment::from_parts(
        CommentId::new(row.get("id")),
        row.get("description"),
        IssueId::new(row.get("issue_id")),
        ContributorId::new(row.get("author_id")),
        row.get("created_time"),
    )
}
