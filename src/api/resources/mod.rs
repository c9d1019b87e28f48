//! Resource endpoints for accounts, projects, contributors, issues and comments

pub mod comments;
pub mod contributors;
pub mod issues;
pub mod projects;
pub mod users;

use axum::{routing::get, Router};
use serde::{Deserialize, Deserializer, Serialize};

use super::state::AppState;
use super::types::ApiError;
use crate::domain::comment::CommentId;
use crate::domain::DomainError;

/// Create the resource router
pub fn create_resource_router() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/users", get(users::list_users))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Projects
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{project_id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        // Contributors
        .route(
            "/projects/{project_id}/contributors",
            get(contributors::list_contributors).post(contributors::add_contributor),
        )
        .route(
            "/projects/{project_id}/contributors/{contributor_id}",
            get(contributors::get_contributor).delete(contributors::remove_contributor),
        )
        // Issues
        .route(
            "/projects/{project_id}/issues",
            get(issues::list_issues).post(issues::create_issue),
        )
        .route(
            "/projects/{project_id}/issues/{issue_id}",
            get(issues::get_issue)
                .put(issues::update_issue)
                .delete(issues::delete_issue),
        )
        // Comments
        .route(
            "/projects/{project_id}/issues/{issue_id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/projects/{project_id}/issues/{issue_id}/comments/{comment_id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
}

/// List response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub results: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(results: Vec<T>) -> Self {
        let total = results.len();
        Self { results, total }
    }
}

/// Parse a numeric path segment into a typed id
pub(crate) fn parse_id<T: From<i64>>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse::<i64>()
        .map(T::from)
        .map_err(|_| DomainError::invalid_id(format!("Invalid {} id '{}'", what, raw)).into())
}

pub(crate) fn parse_comment_id(raw: &str) -> Result<CommentId, ApiError> {
    uuid::Uuid::parse_str(raw)
        .map(CommentId::from)
        .map_err(|_| DomainError::invalid_id(format!("Invalid comment id '{}'", raw)).into())
}

/// Distinguish an absent field from an explicit `null`
pub(crate) fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse an optional choice field such as a priority or project type
pub(crate) fn parse_choice<T>(raw: Option<String>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr,
    T::Err: Into<DomainError>,
{
    let Some(value) = raw else {
        return Ok(None);
    };
    let parsed: Result<T, DomainError> = value.parse::<T>().map_err(Into::into);

    Ok(Some(parsed?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::issue::IssuePriority;
    use crate::domain::project::ProjectId;
    use axum::http::StatusCode;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "explicit_null")]
        assignee: Option<Option<i64>>,
    }

    #[test]
    fn test_parse_id() {
        let id: ProjectId = parse_id("42", "project").unwrap();
        assert_eq!(id, ProjectId::new(42));

        let err = parse_id::<ProjectId>("abc", "project").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.code.as_deref(), Some("invalid_id"));
    }

    #[test]
    fn test_parse_comment_id() {
        assert!(parse_comment_id("7d444840-9dc0-11d1-b245-5ffdce74fad2").is_ok());
        assert!(parse_comment_id("7").is_err());
    }

    #[test]
    fn test_explicit_null_vs_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"assignee": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"assignee": 3}"#).unwrap();

        assert_eq!(absent.assignee, None);
        assert_eq!(null.assignee, Some(None));
        assert_eq!(set.assignee, Some(Some(3)));
    }

    #[test]
    fn test_parse_choice() {
        let parsed: Option<IssuePriority> = parse_choice(Some("HIGH".to_string())).unwrap();
        assert_eq!(parsed, Some(IssuePriority::High));

        let err = parse_choice::<IssuePriority>(Some("URGENT".to_string())).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_list_response_total() {
        let list = ListResponse::from(vec![1, 2, 3]);
        assert_eq!(list.total, 3);
    }
}
