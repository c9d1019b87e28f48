//! Comment endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::debug;

use super::{parse_comment_id, parse_id, ListResponse};
use crate::api::middleware::CurrentActor;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::comment::{Comment, CommentId};
use crate::domain::issue::IssueId;
use crate::domain::project::ProjectId;
use crate::infrastructure::services::{CreateCommentRequest, Deletion, UpdateCommentRequest};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentApiRequest {
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCommentApiRequest {
    #[serde(default)]
    pub description: Option<String>,
}

fn parse_parents(project_id: &str, issue_id: &str) -> Result<(ProjectId, IssueId), ApiError> {
    Ok((parse_id(project_id, "project")?, parse_id(issue_id, "issue")?))
}

/// GET /projects/{project_id}/issues/{issue_id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((project_id, issue_id)): Path<(String, String)>,
) -> Result<Json<ListResponse<Comment>>, ApiError> {
    let (project_id, issue_id) = parse_parents(&project_id, &issue_id)?;
    let comments = state
        .lifecycle
        .list_comments(actor, project_id, issue_id)
        .await?;
    Ok(Json(comments.into()))
}

/// POST /projects/{project_id}/issues/{issue_id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((project_id, issue_id)): Path<(String, String)>,
    Json(request): Json<CreateCommentApiRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let (project_id, issue_id) = parse_parents(&project_id, &issue_id)?;
    debug!(project_id = %project_id, issue_id = %issue_id, "Creating comment");

    let comment = state
        .lifecycle
        .create_comment(
            actor,
            project_id,
            issue_id,
            CreateCommentRequest {
                description: request.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /projects/{project_id}/issues/{issue_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((project_id, issue_id, comment_id)): Path<(String, String, String)>,
) -> Result<Json<Comment>, ApiError> {
    let (project_id, issue_id) = parse_parents(&project_id, &issue_id)?;
    let id = parse_comment_id(&comment_id)?;

    Ok(Json(
        state
            .lifecycle
            .get_comment(actor, project_id, issue_id, id)
            .await?,
    ))
}

/// PUT /projects/{project_id}/issues/{issue_id}/comments/{comment_id}
pub async fn update_comment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((project_id, issue_id, comment_id)): Path<(String, String, String)>,
    Json(request): Json<UpdateCommentApiRequest>,
) -> Result<Json<Comment>, ApiError> {
    let (project_id, issue_id) = parse_parents(&project_id, &issue_id)?;
    let id = parse_comment_id(&comment_id)?;
    debug!(comment_id = %id, "Updating comment");

    let comment = state
        .lifecycle
        .update_comment(
            actor,
            project_id,
            issue_id,
            id,
            UpdateCommentRequest {
                description: request.description,
            },
        )
        .await?;

    Ok(Json(comment))
}

/// DELETE /projects/{project_id}/issues/{issue_id}/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((project_id, issue_id, comment_id)): Path<(String, String, String)>,
) -> Result<Json<Deletion<CommentId>>, ApiError> {
    let (project_id, issue_id) = parse_parents(&project_id, &issue_id)?;
    let id = parse_comment_id(&comment_id)?;
    debug!(comment_id = %id, "Deleting comment");

    Ok(Json(
        state
            .lifecycle
            .delete_comment(actor, project_id, issue_id, id)
            .await?,
    ))
}
