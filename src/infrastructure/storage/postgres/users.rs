//! PostgreSQL user repository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::map_sqlx_error;
use crate::domain::user::{NewUser, User, UserId, UserParts, UserRepository};
use crate::domain::DomainError;

const USER_COLUMNS: &str = "id, username, email, password_hash, age, can_be_contacted, \
                            can_data_be_shared, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "get user"))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "get user by username"))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, age, can_be_contacted,
                               can_data_be_shared)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(age_to_column(user.age)?)
        .bind(user.can_be_contacted)
        .bind(user.can_data_be_shared)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "create user"))?;

        row_to_user(&row)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, age = $4, can_be_contacted = $5,
                can_data_be_shared = $6, updated_at = $7
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id().value())
        .bind(user.email())
        .bind(user.password_hash())
        .bind(age_to_column(user.age())?)
        .bind(user.can_be_contacted())
        .bind(user.can_data_be_shared())
        .bind(user.updated_at())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "update user"))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!("User '{}' not found", user.id()))),
        }
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        // Contributions, projects and issues cascade; assignments are nulled
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "delete user"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "list users"))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn exists(&self, id: UserId) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id.value())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "check user"))
    }
}

fn age_to_column(age: Option<u32>) -> Result<Option<i32>, DomainError> {
    age.map(i32::try_from)
        .transpose()
        .map_err(|_| DomainError::validation("Age is out of range"))
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let age: Option<i32> = row.get("age");
    let age = age
        .map(u32::try_from)
        .transpose()
        .map_err(|e| DomainError::storage(format!("Invalid age in database: {}", e)))?;

    Ok(User::from_parts(UserParts {
        id: UserId::new(row.get("id")),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        age,
        can_be_contacted: row.get("can_be_contacted"),
        can_data_be_shared: row.get("can_data_be_shared"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }))
}
