//! Project endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::debug;

use super::{parse_choice, parse_id, ListResponse};
use crate::api::middleware::CurrentActor;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::project::{Project, ProjectId, ProjectType};
use crate::domain::DomainError;
use crate::infrastructure::services::{CreateProjectRequest, Deletion, UpdateProjectRequest};

/// Request to create a project. Any `author` sent by the client is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectApiRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub project_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProjectApiRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub project_type: Option<String>,
}

/// GET /projects
pub async fn list_projects(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ListResponse<Project>>, ApiError> {
    let projects = state.lifecycle.list_projects(actor).await?;
    Ok(Json(projects.into()))
}

/// POST /projects
pub async fn create_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<CreateProjectApiRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    debug!(title = %request.title, "Creating project");

    actor.require_user()?;
    let project_type: ProjectType = request
        .project_type
        .parse()
        .map_err(DomainError::from)?;
    let project = state
        .lifecycle
        .create_project(
            actor,
            CreateProjectRequest {
                title: request.title,
                description: request.description,
                project_type,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /projects/{project_id}
pub async fn get_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let id: ProjectId = parse_id(&project_id, "project")?;
    Ok(Json(state.lifecycle.get_project(actor, id).await?))
}

/// PUT /projects/{project_id}
pub async fn update_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(project_id): Path<String>,
    Json(request): Json<UpdateProjectApiRequest>,
) -> Result<Json<Project>, ApiError> {
    let id: ProjectId = parse_id(&project_id, "project")?;
    debug!(project_id = %id, "Updating project");

    let project = state
        .lifecycle
        .update_project(
            actor,
            id,
            UpdateProjectRequest {
                title: request.title,
                description: request.description,
                project_type: parse_choice(request.project_type)?,
            },
        )
        .await?;

    Ok(Json(project))
}

/// DELETE /projects/{project_id}
pub async fn delete_project(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(project_id): Path<String>,
) -> Result<Json<Deletion<ProjectId>>, ApiError> {
    let id: ProjectId = parse_id(&project_id, "project")?;
    debug!(project_id = %id, "Deleting project");

    Ok(Json(state.lifecycle.delete_project(actor, id).await?))
}
