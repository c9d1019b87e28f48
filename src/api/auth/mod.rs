//! Authentication API endpoints
//!
//! Registration, login and current-user lookup for JWT-based authentication.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::User;
use crate::infrastructure::user::RegisterUserRequest;

/// Create the authentication router, mounted under `/auth`
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(get_current_user))
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub can_be_contacted: bool,
    #[serde(default)]
    pub can_data_be_shared: bool,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub expires_at: String,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    debug!(username = %request.username, "Registering user");

    let user = state
        .user_service
        .register(RegisterUserRequest {
            username: request.username,
            password: request.password,
            email: request.email,
            age: request.age,
            can_be_contacted: request.can_be_contacted,
            can_data_be_shared: request.can_data_be_shared,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login
///
/// Returns a JWT token on successful authentication.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&request.username, &request.password)
        .await?
        .ok_or_else(|| {
            ApiError::unauthorized("Invalid username or password").with_code("invalid_credentials")
        })?;

    let token = state.jwt_service.generate(&user)?;
    let expires_at = Utc::now() + Duration::hours(state.jwt_service.expiration_hours() as i64);

    Ok(Json(LoginResponse {
        token,
        user,
        expires_at: expires_at.to_rfc3339(),
    }))
}

/// GET /auth/me
pub async fn get_current_user(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}
