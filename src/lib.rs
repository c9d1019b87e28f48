//! SoftDesk API
//!
//! Issue tracking for project teams:
//! - Accounts with JWT authentication
//! - Projects with contributor membership
//! - Issues and comments scoped to their project
//! - Author-only writes, contributor-only reads

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::auth::JwtService;
use infrastructure::storage::StorageFactory;
use tracing::info;

/// Create the application state from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_config = config.storage.to_storage_config()?;
    info!("Storage backend: {:?}", storage_config.storage_type());

    let repositories =
        StorageFactory::create(&storage_config, config.storage.run_migrations).await?;
    let jwt_service = Arc::new(JwtService::new(config.auth.to_jwt_config()));

    Ok(AppState::new(repositories, jwt_service))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::api::create_router_with_state;

    #[tokio::test]
    async fn test_create_app_state_in_memory() {
        let state = create_app_state(&AppConfig::default()).await.unwrap();

        assert!(state.repositories.ping().await.is_ok());
        assert_eq!(state.jwt_service.expiration_hours(), 24);
    }

    #[tokio::test]
    async fn test_create_app_state_rejects_unknown_backend() {
        let mut config = AppConfig::default();
        config.storage.backend = "cassandra".to_string();

        let err = create_app_state(&config).await.unwrap_err();
        assert!(err.to_string().contains("cassandra"));
    }

    #[tokio::test]
    async fn test_token_signed_with_guessable_secret_is_rejected() {
        let config = AppConfig::default();
        if config.auth.jwt_secret.is_some() || std::env::var("JWT_SECRET").is_ok() {
            return;
        }
        let app = create_router_with_state(create_app_state(&config).await.unwrap());

        let register = Request::builder()
            .method(Method::POST)
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "username": "victim", "password": "password123", "age": 30 })
                    .to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(register).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let now = chrono::Utc::now().timestamp();
        let claims = json!({ "sub": "1", "username": "victim", "iat": now, "exp": now + 3600 });
        let forged = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"change-me-in-production"),
        )
        .unwrap();

        let request = Request::builder()
            .method(Method::GET)
            .uri("/auth/me")
            .header(header::AUTHORIZATION, format!("Bearer {}", forged))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
