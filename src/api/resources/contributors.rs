//! Contributor endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::debug;

use super::{parse_id, ListResponse};
use crate::api::middleware::CurrentActor;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::contributor::{Contributor, ContributorId};
use crate::domain::project::ProjectId;
use crate::domain::user::UserId;
use crate::infrastructure::services::Deletion;

/// Request to add a user to a project
#[derive(Debug, Clone, Deserialize)]
pub struct AddContributorApiRequest {
    pub user: i64,
}

/// GET /projects/{project_id}/contributors
pub async fn list_contributors(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(project_id): Path<String>,
) -> Result<Json<ListResponse<Contributor>>, ApiError> {
    let project_id: ProjectId = parse_id(&project_id, "project")?;
    let contributors = state.lifecycle.list_contributors(actor, project_id).await?;
    Ok(Json(contributors.into()))
}

/// POST /projects/{project_id}/contributors
pub async fn add_contributor(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(project_id): Path<String>,
    Json(request): Json<AddContributorApiRequest>,
) -> Result<(StatusCode, Json<Contributor>), ApiError> {
    let project_id: ProjectId = parse_id(&project_id, "project")?;
    let user = UserId::new(request.user);
    debug!(project_id = %project_id, user_id = %user, "Adding contributor");

    let contributor = state
        .lifecycle
        .add_contributor(actor, project_id, user)
        .await?;

    Ok((StatusCode::CREATED, Json(contributor)))
}

/// GET /projects/{project_id}/contributors/{contributor_id}
pub async fn get_contributor(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((project_id, contributor_id)): Path<(String, String)>,
) -> Result<Json<Contributor>, ApiError> {
    let project_id: ProjectId = parse_id(&project_id, "project")?;
    let id: ContributorId = parse_id(&contributor_id, "contributor")?;

    Ok(Json(
        state.lifecycle.get_contributor(actor, project_id, id).await?,
    ))
}

/// DELETE /projects/{project_id}/contributors/{contributor_id}
pub async fn remove_contributor(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((project_id, contributor_id)): Path<(String, String)>,
) -> Result<Json<Deletion<ContributorId>>, ApiError> {
    let project_id: ProjectId = parse_id(&project_id, "project")?;
    let id: ContributorId = parse_id(&contributor_id, "contributor")?;
    debug!(project_id = %project_id, contributor_id = %id, "Removing contributor");

    Ok(Json(
        state
            .lifecycle
            .remove_contributor(actor, project_id, id)
            .await?,
    ))
}
