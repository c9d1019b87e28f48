//! PostgreSQL issue repository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{map_sqlx_error, parse_column};
use crate::domain::issue::{Issue, IssueId, IssueParts, IssueRepository, NewIssue};
use crate::domain::project::ProjectId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

const ISSUE_COLUMNS: &str = "id, title, description, project_id, author_id, assignee_id, \
                             priority, tag, status, created_time";

/// PostgreSQL implementation of IssueRepository
#[derive(Debug, Clone)]
pub struct PostgresIssueRepository {
    pool: PgPool,
}

impl PostgresIssueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IssueRepository for PostgresIssueRepository {
    async fn get(&self, id: IssueId) -> Result<Option<Issue>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM issues WHERE id = $1", ISSUE_COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "get issue"))?;

        row.as_ref().map(row_to_issue).transpose()
    }

    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Issue>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM issues WHERE project_id = $1 ORDER BY id",
            ISSUE_COLUMNS
        ))
        .bind(project.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "list issues"))?;

        rows.iter().map(row_to_issue).collect()
    }

    async fn create(&self, issue: NewIssue) -> Result<Issue, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO issues (title, description, project_id, author_id, assignee_id,
                                priority, tag, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ISSUE_COLUMNS
        ))
        .bind(&issue.title)
        .bind(&issue.description)
        .bind(issue.project.value())
        .bind(issue.author.value())
        .bind(issue.assignee.map(|a| a.value()))
        .bind(issue.priority.as_str())
        .bind(issue.tag.as_str())
        .bind(issue.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "create issue"))?;

        row_to_issue(&row)
    }

    async fn update(&self, issue: &Issue) -> Result<Issue, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE issues
            SET title = $2, description = $3, assignee_id = $4, priority = $5,
                tag = $6, status = $7
            WHERE id = $1
            RETURNING {}
            "#,
            ISSUE_COLUMNS
        ))
        .bind(issue.id().value())
        .bind(issue.title())
        .bind(issue.description())
        .bind(issue.assignee().map(|a| a.value()))
        .bind(issue.priority().as_str())
        .bind(issue.tag().as_str())
        .bind(issue.status().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "update issue"))?;

        match row {
            Some(row) => row_to_issue(&row),
            None => Err(DomainError::not_found(format!("Issue '{}' not found", issue.id()))),
        }
    }

    async fn delete(&self, id: IssueId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "delete issue"))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_issue(row: &PgRow) -> Result<Issue, DomainError> {
    let priority: String = row.get("priority");
    let tag: String = row.get("tag");
    let status: String = row.get("status");
    let assignee: Option<i64> = row.get("assignee_id");

    Ok(Issue::from_parts(IssueParts {
        id: IssueId::new(row.get("id")),
        title: row.get("title"),
        description: row.get("description"),
        project: ProjectId::new(row.get("project_id")),
        author: UserId::new(row.get("author_id")),
        assignee: assignee.map(UserId::new),
        priority: parse_column(&priority)?,
        tag: parse_column(&tag)?,
        status: parse_column(&status)?,
        created_time: row.get("created_time"),
    }))
}
