//! Database migrations
//!
//! Schema changes are embedded as SQL and tracked in a `_migrations` table.
//! Ownership cascades, the membership uniqueness and the minimum age are
//! all declared here so the database enforces them independently of the
//! application.

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use crate::domain::DomainError;

/// Trait for running database migrations
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Runs all pending migrations
    async fn run(&self) -> Result<(), DomainError>;

    /// Reverts the last applied migration
    async fn revert(&self) -> Result<(), DomainError>;

    /// Returns the current migration version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// PostgreSQL migrator over the embedded schema
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            migrations: schema_migrations(),
        }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                success BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))
    }

    /// Applies one migration and records it. The SQL is sent as one
    /// simple-protocol batch, which PostgreSQL runs as a single implicit
    /// transaction.
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        if self.is_applied(migration.version).await? {
            return Ok(false);
        }

        sqlx::raw_sql(&migration.up)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tracing::info!(
            version = migration.version,
            description = %migration.description,
            "Applied migration"
        );

        Ok(true)
    }

    /// Reverts one migration and removes its record
    pub async fn revert_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        if !self.is_applied(migration.version).await? {
            return Ok(());
        }

        sqlx::raw_sql(&migration.down)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to revert migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to remove migration record {}: {}",
                    migration.version, e
                ))
            })?;

        tracing::info!(version = migration.version, "Reverted migration");

        Ok(())
    }

    /// The embedded migration with the given version
    fn find(&self, version: i64) -> Result<&Migration, DomainError> {
        self.migrations
            .iter()
            .find(|m| m.version == version)
            .ok_or_else(|| {
                DomainError::storage(format!(
                    "Applied migration {} is unknown to this build",
                    version
                ))
            })
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<(), DomainError> {
        let mut applied = 0;

        for migration in &self.migrations {
            if self.run_migration(migration).await? {
                applied += 1;
            }
        }

        tracing::info!(applied, total = self.migrations.len(), "Migrations up to date");

        Ok(())
    }

    async fn revert(&self) -> Result<(), DomainError> {
        let Some(current) = self.version().await? else {
            return Ok(());
        };

        let migration = self.find(current)?;
        self.revert_migration(migration).await
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations WHERE success = TRUE")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

/// A single schema change
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
    /// SQL to run when reverting the migration
    pub down: String,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
            down: down.into(),
        }
    }
}

/// The full schema, in application order
pub fn schema_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username VARCHAR(150) NOT NULL,
                email VARCHAR(254),
                password_hash TEXT NOT NULL,
                age INTEGER,
                can_be_contacted BOOLEAN NOT NULL DEFAULT FALSE,
                can_data_be_shared BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT users_username_key UNIQUE (username),
                CONSTRAINT users_age_check CHECK (age IS NULL OR age >= 15)
            );
            "#,
            r#"
            DROP TABLE IF EXISTS users;
            "#,
        ),
        Migration::new(
            2,
            "Create projects table",
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id BIGSERIAL PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                type VARCHAR(16) NOT NULL
                    CHECK (type IN ('BACKEND', 'FRONTEND', 'IOS', 'ANDROID')),
                author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_time TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_projects_author ON projects(author_id);
            "#,
            r#"
            DROP TABLE IF EXISTS projects;
            "#,
        ),
        Migration::new(
            3,
            "Create contributors table",
            r#"
            CREATE TABLE IF NOT EXISTS contributors (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                created_time TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT contributors_user_project_key UNIQUE (user_id, project_id)
            );
            CREATE INDEX IF NOT EXISTS idx_contributors_project ON contributors(project_id);
            "#,
            r#"
            DROP TABLE IF EXISTS contributors;
            "#,
        ),
        Migration::new(
            4,
            "Create issues table",
            r#"
            CREATE TABLE IF NOT EXISTS issues (
                id BIGSERIAL PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                assignee_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
                priority VARCHAR(16) NOT NULL DEFAULT 'LOW'
                    CHECK (priority IN ('LOW', 'MEDIUM', 'HIGH')),
                tag VARCHAR(16) NOT NULL DEFAULT 'TASK'
                    CHECK (tag IN ('BUG', 'FEATURE', 'TASK')),
                status VARCHAR(16) NOT NULL DEFAULT 'TODO'
                    CHECK (status IN ('TODO', 'IN_PROGRESS', 'FINISHED')),
                created_time TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_issues_project ON issues(project_id);
            "#,
            r#"
            DROP TABLE IF EXISTS issues;
            "#,
        ),
        Migration::new(
            5,
            "Create comments table",
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id UUID PRIMARY KEY,
                description TEXT NOT NULL,
                issue_id BIGINT NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
                author_id BIGINT NOT NULL REFERENCES contributors(id) ON DELETE CASCADE,
                created_time TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_comments_issue ON comments(issue_id);
            "#,
            r#"
            DROP TABLE IF EXISTS comments;
            "#,
        ),
    ]
}

/// Runs all pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    PostgresMigrator::new(pool.clone()).run().await
}

/// Reverts the most recently applied migration, returning the version now
/// in effect
pub async fn revert_last_migration(pool: &PgPool) -> Result<Option<i64>, DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());
    migrator.revert().await?;
    migrator.version().await
}
