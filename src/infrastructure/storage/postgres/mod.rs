//! PostgreSQL repositories with connection pooling
//!
//! Each entity gets its own repository over a shared [`PgPool`]. Integrity
//! rules live in the schema (see `migrations`); constraint violations are
//! translated back into domain errors by [`map_sqlx_error`].

mod comments;
mod contributors;
mod issues;
mod projects;
mod users;

use std::time::Duration;

use sqlx::error::ErrorKind;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::domain::DomainError;

pub use comments::PostgresCommentRepository;
pub use contributors::PostgresContributorRepository;
pub use issues::PostgresIssueRepository;
pub use projects::PostgresProjectRepository;
pub use users::PostgresUserRepository;

/// Name of the unique constraint on (user_id, project_id)
pub(crate) const MEMBERSHIP_UNIQUE_CONSTRAINT: &str = "contributors_user_project_key";

/// PostgreSQL connection configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/softdesk".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }
}

/// Open a connection pool
pub async fn connect(config: &PostgresConfig) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

    tracing::info!(
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );

    Ok(pool)
}

/// Translate a driver error into a domain error.
///
/// Constraint violations become the matching domain kind; everything else
/// is a storage failure described by `action`.
pub(crate) fn map_sqlx_error(err: sqlx::Error, action: &str) -> DomainError {
    if let Some(db_err) = err.as_database_error() {
        let constraint = db_err.constraint().unwrap_or_default();

        match db_err.kind() {
            ErrorKind::UniqueViolation if constraint == MEMBERSHIP_UNIQUE_CONSTRAINT => {
                return DomainError::duplicate_membership(
                    "This user is already a contributor of the project",
                );
            }
            ErrorKind::UniqueViolation if constraint == "users_username_key" => {
                return DomainError::conflict("A user with that username already exists");
            }
            ErrorKind::UniqueViolation => {
                return DomainError::conflict(format!("Failed to {}: duplicate value", action));
            }
            ErrorKind::ForeignKeyViolation => {
                return DomainError::not_found(format!(
                    "Referenced {} does not exist",
                    referenced_entity(constraint)
                ));
            }
            ErrorKind::CheckViolation if constraint == "users_age_check" => {
                return DomainError::validation(format!(
                    "Users must be at least {} years old",
                    crate::domain::user::MIN_USER_AGE
                ));
            }
            ErrorKind::CheckViolation => {
                return DomainError::validation(format!(
                    "Failed to {}: constraint {} violated",
                    action, constraint
                ));
            }
            _ => {}
        }
    }

    DomainError::storage(format!("Failed to {}: {}", action, err))
}

/// Entity named by a foreign key constraint, using Postgres default names
fn referenced_entity(constraint: &str) -> &'static str {
    match constraint {
        "comments_author_id_fkey" => "contributor",
        "comments_issue_id_fkey" => "issue",
        c if c.ends_with("project_id_fkey") => "project",
        c if c.ends_with("user_id_fkey")
            || c.ends_with("author_id_fkey")
            || c.ends_with("assignee_id_fkey") =>
        {
            "user"
        }
        _ => "record",
    }
}

/// Decode a stored choice column into its enum
pub(crate) fn parse_column<T>(value: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid value in database: {}", e)))
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    use sqlx::error::DatabaseError;

    use super::*;

    /// Driver error as PostgreSQL reports a violated constraint
    #[derive(Debug)]
    struct ConstraintViolation {
        kind: ErrorKind,
        constraint: &'static str,
    }

    impl fmt::Display for ConstraintViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "violates constraint \"{}\"", self.constraint)
        }
    }

    impl StdError for ConstraintViolation {}

    impl DatabaseError for ConstraintViolation {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.kind {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                ErrorKind::CheckViolation => ErrorKind::CheckViolation,
                ErrorKind::NotNullViolation => ErrorKind::NotNullViolation,
                _ => ErrorKind::Other,
            }
        }

        fn constraint(&self) -> Option<&str> {
            Some(self.constraint)
        }
    }

    fn violation(kind: ErrorKind, constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintViolation { kind, constraint }))
    }

    #[test]
    fn test_membership_unique_violation_is_duplicate_membership() {
        let err = map_sqlx_error(
            violation(ErrorKind::UniqueViolation, MEMBERSHIP_UNIQUE_CONSTRAINT),
            "add contributor",
        );

        assert!(matches!(err, DomainError::DuplicateMembership { .. }));
        assert_eq!(err.code(), "duplicate_membership");
    }

    #[test]
    fn test_username_unique_violation_is_conflict() {
        let err = map_sqlx_error(
            violation(ErrorKind::UniqueViolation, "users_username_key"),
            "create user",
        );

        assert!(matches!(err, DomainError::Conflict { .. }));
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_other_unique_violation_is_conflict() {
        let err = map_sqlx_error(
            violation(ErrorKind::UniqueViolation, "some_other_key"),
            "update issue",
        );

        assert!(matches!(err, DomainError::Conflict { .. }));
        assert!(err.to_string().contains("update issue"));
    }

    #[test]
    fn test_age_check_violation_is_validation() {
        let err = map_sqlx_error(
            violation(ErrorKind::CheckViolation, "users_age_check"),
            "create user",
        );

        assert!(matches!(err, DomainError::Validation { .. }));
        assert!(err.to_string().contains("15"));
    }

    #[test]
    fn test_foreign_key_violation_names_missing_entity() {
        let err = map_sqlx_error(
            violation(ErrorKind::ForeignKeyViolation, "contributors_project_id_fkey"),
            "add contributor",
        );

        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(err.to_string().contains("project"));

        // The author row in `create_with_author` fails the same way, and the
        // transaction is rolled back when it is dropped on the error path
        let err = map_sqlx_error(
            violation(ErrorKind::ForeignKeyViolation, "projects_author_id_fkey"),
            "create project",
        );
        assert!(err.to_string().contains("user"));
    }

    #[test]
    fn test_unmapped_database_error_is_storage() {
        let err = map_sqlx_error(
            violation(ErrorKind::NotNullViolation, "issues_title_not_null"),
            "create issue",
        );

        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[test]
    fn test_referenced_entity_from_constraint() {
        assert_eq!(referenced_entity("contributors_project_id_fkey"), "project");
        assert_eq!(referenced_entity("issues_project_id_fkey"), "project");
        assert_eq!(referenced_entity("contributors_user_id_fkey"), "user");
        assert_eq!(referenced_entity("issues_assignee_id_fkey"), "user");
        assert_eq!(referenced_entity("projects_author_id_fkey"), "user");
        assert_eq!(referenced_entity("comments_author_id_fkey"), "contributor");
        assert_eq!(referenced_entity("comments_issue_id_fkey"), "issue");
        assert_eq!(referenced_entity("something_else"), "record");
    }

    #[test]
    fn test_non_database_errors_are_storage_errors() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound, "get project");

        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(err.to_string().contains("get project"));
    }

    #[test]
    fn test_parse_column() {
        use crate::domain::issue::IssueStatus;

        let status: IssueStatus = parse_column("IN_PROGRESS").unwrap();
        assert_eq!(status, IssueStatus::InProgress);
        assert!(parse_column::<IssueStatus>("DONE").is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = PostgresConfig::new("postgres://db/softdesk")
            .with_max_connections(4)
            .with_connect_timeout(5);

        assert_eq!(config.url, "postgres://db/softdesk");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.min_connections, 1);
    }
}
