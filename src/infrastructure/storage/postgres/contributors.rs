//! PostgreSQL contributor repository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::map_sqlx_error;
use crate::domain::contributor::{Contributor, ContributorId, ContributorRepository};
use crate::domain::project::ProjectId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// PostgreSQL implementation of ContributorRepository.
/// Duplicate memberships are rejected by the `UNIQUE (user_id, project_id)`
/// constraint, never by a prior lookup.
#[derive(Debug, Clone)]
pub struct PostgresContributorRepository {
    pool: PgPool,
}

impl PostgresContributorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContributorRepository for PostgresContributorRepository {
    async fn insert(&self, user: UserId, project: ProjectId) -> Result<Contributor, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO contributors (user_id, project_id)
            VALUES ($1, $2)
            RETURNING id, user_id, project_id, created_time
            "#,
        )
        .bind(user.value())
        .bind(project.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "add contributor"))?;

        Ok(row_to_contributor(&row))
    }

    async fn get(&self, id: ContributorId) -> Result<Option<Contributor>, DomainError> {
        let row = sqlx::query(
            "SELECT id, user_id, project_id, created_time FROM contributors WHERE id = $1",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "get contributor"))?;

        Ok(row.as_ref().map(row_to_contributor))
    }

    async fn find(
        &self,
        user: UserId,
        project: ProjectId,
    ) -> Result<Option<Contributor>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, project_id, created_time
            FROM contributors
            WHERE user_id = $1 AND project_id = $2
            "#,
        )
        .bind(user.value())
        .bind(project.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "find contributor"))?;

        Ok(row.as_ref().map(row_to_contributor))
    }

    async fn delete(&self, user: UserId, project: ProjectId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM contributors WHERE user_id = $1 AND project_id = $2")
            .bind(user.value())
            .bind(project.value())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "remove contributor"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Contributor>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, project_id, created_time
            FROM contributors
            WHERE project_id = $1
            ORDER BY id
            "#,
        )
        .bind(project.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "list contributors"))?;

        Ok(rows.iter().map(row_to_contributor).collect())
    }
}

fn row_to_contributor(row: &PgRow) -> Contributor {
    Contributor::from_parts(
        ContributorId::new(row.get("id")),
        UserId::new(row.get("user_id")),
        ProjectId::new(row.get("project_id")),
        row.get("created_time"),
    )
}
