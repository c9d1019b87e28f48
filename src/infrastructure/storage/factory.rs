//! Storage factory for runtime backend selection

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::comment::CommentRepository;
use crate::domain::contributor::ContributorRepository;
use crate::domain::issue::IssueRepository;
use crate::domain::project::ProjectRepository;
use crate::domain::user::UserRepository;
use crate::domain::DomainError;

use super::in_memory::InMemoryStore;
use super::migrations::run_migrations;
use super::postgres::{
    self, PostgresCommentRepository, PostgresConfig, PostgresContributorRepository,
    PostgresIssueRepository, PostgresProjectRepository, PostgresUserRepository,
};

/// Supported storage backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres(config)
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// One handle per repository trait, all backed by the same store
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub contributors: Arc<dyn ContributorRepository>,
    pub issues: Arc<dyn IssueRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pool: Option<PgPool>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories")
            .field("postgres", &self.pool.is_some())
            .finish()
    }
}

impl Repositories {
    /// Bundle arbitrary repository implementations
    pub fn new(
        users: Arc<dyn UserRepository>,
        projects: Arc<dyn ProjectRepository>,
        contributors: Arc<dyn ContributorRepository>,
        issues: Arc<dyn IssueRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            users,
            projects,
            contributors,
            issues,
            comments,
            pool: None,
        }
    }

    /// Repositories sharing a single in-memory store
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());

        Self {
            users: store.clone(),
            projects: store.clone(),
            contributors: store.clone(),
            issues: store.clone(),
            comments: store,
            pool: None,
        }
    }

    /// Repositories sharing a PostgreSQL pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            projects: Arc::new(PostgresProjectRepository::new(pool.clone())),
            contributors: Arc::new(PostgresContributorRepository::new(pool.clone())),
            issues: Arc::new(PostgresIssueRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Check the backing store is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .map_err(|e| DomainError::storage(format!("Database unreachable: {}", e)))?;
        }

        Ok(())
    }
}

/// Factory for building repositories from configuration
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(
        config: &StorageConfig,
        apply_migrations: bool,
    ) -> Result<Repositories, DomainError> {
        match config {
            StorageConfig::InMemory => {
                tracing::info!("Using in-memory storage");
                Ok(Repositories::in_memory())
            }
            StorageConfig::Postgres(pg_config) => {
                let pool = postgres::connect(pg_config).await?;

                if apply_migrations {
                    run_migrations(&pool).await?;
                }

                Ok(Repositories::postgres(pool))
            }
        }
    }
}
