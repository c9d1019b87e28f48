//! Issue endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::debug;

use super::{explicit_null, parse_choice, parse_id, ListResponse};
use crate::api::middleware::CurrentActor;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::issue::{Issue, IssueId};
use crate::domain::project::ProjectId;
use crate::domain::user::UserId;
use crate::infrastructure::services::{CreateIssueRequest, Deletion, UpdateIssueRequest};

/// Request to file an issue. `author` and `project` come from the caller and
/// the path, never from the body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIssueApiRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub assignee: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateIssueApiRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub assignee: Option<Option<i64>>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// GET /projects/{project_id}/issues
pub async fn list_issues(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(project_id): Path<String>,
) -> Result<Json<ListResponse<Issue>>, ApiError> {
    let project_id: ProjectId = parse_id(&project_id, "project")?;
    let issues = state.lifecycle.list_issues(actor, project_id).await?;
    Ok(Json(issues.into()))
}

/// POST /projects/{project_id}/issues
pub async fn create_issue(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(project_id): Path<String>,
    Json(request): Json<CreateIssueApiRequest>,
) -> Result<(StatusCode, Json<Issue>), ApiError> {
    let project_id: ProjectId = parse_id(&project_id, "project")?;
    debug!(project_id = %project_id, title = %request.title, "Creating issue");

    let issue = state
        .lifecycle
        .create_issue(
            actor,
            project_id,
            CreateIssueRequest {
                title: request.title,
                description: request.description,
                assignee: request.assignee.map(UserId::new),
                priority: parse_choice(request.priority)?,
                tag: parse_choice(request.tag)?,
                status: parse_choice(request.status)?,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(issue)))
}

/// GET /projects/{project_id}/issues/{issue_id}
pub async fn get_issue(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((project_id, issue_id)): Path<(String, String)>,
) -> Result<Json<Issue>, ApiError> {
    let project_id: ProjectId = parse_id(&project_id, "project")?;
    let id: IssueId = parse_id(&issue_id, "issue")?;

    Ok(Json(state.lifecycle.get_issue(actor, project_id, id).await?))
}

/// PUT /projects/{project_id}/issues/{issue_id}
pub async fn update_issue(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((project_id, issue_id)): Path<(String, String)>,
    Json(request): Json<UpdateIssueApiRequest>,
) -> Result<Json<Issue>, ApiError> {
    let project_id: ProjectId = parse_id(&project_id, "project")?;
    let id: IssueId = parse_id(&issue_id, "issue")?;
    debug!(project_id = %project_id, issue_id = %id, "Updating issue");

    let issue = state
        .lifecycle
        .update_issue(
            actor,
            project_id,
            id,
            UpdateIssueRequest {
                title: request.title,
                description: request.description,
                assignee: request.assignee.map(|a| a.map(UserId::new)),
                priority: parse_choice(request.priority)?,
                tag: parse_choice(request.tag)?,
                status: parse_choice(request.status)?,
            },
        )
        .await?;

    Ok(Json(issue))
}

/// DELETE /projects/{project_id}/issues/{issue_id}
pub async fn delete_issue(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((project_id, issue_id)): Path<(String, String)>,
) -> Result<Json<Deletion<IssueId>>, ApiError> {
    let project_id: ProjectId = parse_id(&project_id, "project")?;
    let id: IssueId = parse_id(&issue_id, "issue")?;
    debug!(project_id = %project_id, issue_id = %id, "Deleting issue");

    Ok(Json(
        state.lifecycle.delete_issue(actor, project_id, id).await?,
    ))
}
