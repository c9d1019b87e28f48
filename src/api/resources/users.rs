//! Account endpoints

use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::debug;

use super::{explicit_null, parse_id, ListResponse};
use crate::api::middleware::CurrentActor;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{User, UserId};
use crate::infrastructure::services::Deletion;
use crate::infrastructure::user::UpdateUserRequest;

/// Request to update one's own account
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserApiRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub age: Option<Option<u32>>,
    #[serde(default)]
    pub can_be_contacted: Option<bool>,
    #[serde(default)]
    pub can_data_be_shared: Option<bool>,
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<ListResponse<User>>, ApiError> {
    let users = state.user_service.list().await?;
    Ok(Json(users.into()))
}

/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id: UserId = parse_id(&user_id, "user")?;
    Ok(Json(state.user_service.get(id).await?))
}

/// PUT /users/{user_id}
pub async fn update_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserApiRequest>,
) -> Result<Json<User>, ApiError> {
    let id: UserId = parse_id(&user_id, "user")?;
    debug!(user_id = %id, "Updating user");

    let user = state
        .user_service
        .update(
            actor,
            id,
            UpdateUserRequest {
                password: request.password,
                email: request.email,
                age: request.age,
                can_be_contacted: request.can_be_contacted,
                can_data_be_shared: request.can_data_be_shared,
            },
        )
        .await?;

    Ok(Json(user))
}

/// DELETE /users/{user_id}
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(user_id): Path<String>,
) -> Result<Json<Deletion<UserId>>, ApiError> {
    let id: UserId = parse_id(&user_id, "user")?;
    debug!(user_id = %id, "Deleting user");

    Ok(Json(state.user_service.delete(actor, id).await?))
}
