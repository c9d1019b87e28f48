//! PostgreSQL project repository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{map_sqlx_error, parse_column};
use crate::domain::contributor::{Contributor, ContributorId};
use crate::domain::project::{NewProject, Project, ProjectId, ProjectRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const PROJECT_COLUMNS: &str = "id, title, description, type, author_id, created_time";

/// PostgreSQL implementation of ProjectRepository
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn get(&self, id: ProjectId) -> Result<Option<Project>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "get project"))?;

        row.as_ref().map(row_to_project).transpose()
    }

    async fn list(&self) -> Result<Vec<Project>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM projects ORDER BY id",
            PROJECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "list projects"))?;

        rows.iter().map(row_to_project).collect()
    }

    async fn create_with_author(
        &self,
        project: NewProject,
    ) -> Result<(Project, Contributor), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(e, "begin transaction"))?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO projects (title, description, type, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.project_type.as_str())
        .bind(project.author.value())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e, "create project"))?;

        let project = row_to_project(&row)?;

        let row = sqlx::query(
            r#"
            INSERT INTO contributors (user_id, project_id)
            VALUES ($1, $2)
            RETURNING id, created_time
            "#,
        )
        .bind(project.author().value())
        .bind(project.id().value())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e, "register project author"))?;

        let contributor = Contributor::from_parts(
            ContributorId::new(row.get("id")),
            project.author(),
            project.id(),
            row.get("created_time"),
        );

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(e, "commit project creation"))?;

        Ok((project, contributor))
    }

    async fn update(&self, project: &Project) -> Result<Project, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE projects
            SET title = $2, description = $3, type = $4
            WHERE id = $1
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(project.id().value())
        .bind(project.title())
        .bind(project.description())
        .bind(project.project_type().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "update project"))?;

        match row {
            Some(row) => row_to_project(&row),
            None => Err(DomainError::not_found(format!(
                "Project '{}' not found",
                project.id()
            ))),
        }
    }

    async fn delete(&self, id: ProjectId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "delete project"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: ProjectId) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
            .bind(id.value())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "check project"))
    }
}

fn row_to_project(row: &PgRow) -> Result<Project, DomainError> {
    let project_type: String = row.get("type");

    Ok(Project::from_parts(
        ProjectId::new(row.get("id")),
        row.get("title"),
        row.get("description"),
        parse_column(&project_type)?,
        UserId::new(row.get("author_id")),
        row.get("created_time"),
    ))
}
