use axum::{
    http::{HeaderName, Request},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;

use super::auth;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::resources;
use super::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Registration and authentication
        .route("/register", post(auth::register))
        .nest("/auth", auth::create_auth_router())
        // Projects and everything below them
        .merge(resources::create_resource_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::infrastructure::auth::{JwtConfig, JwtService};
    use crate::infrastructure::storage::Repositories;

    fn app() -> Router {
        let jwt = JwtService::new(JwtConfig::new("router-test-secret", 1));
        create_router_with_state(AppState::new(Repositories::in_memory(), Arc::new(jwt)))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    /// Register and log in, returning (user id, token)
    async fn sign_up(app: &Router, username: &str) -> (i64, String) {
        let (status, user) = send(
            app,
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": username, "password": "password123", "age": 30 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, login) = send(
            app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": username, "password": "password123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        (
            user["id"].as_i64().unwrap(),
            login["token"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&app, Method::GET, "/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"][0]["name"], "store");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/live")
                    .header(REQUEST_ID_HEADER, "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-123");
    }

    #[tokio::test]
    async fn test_register_hides_password_and_rejects_minors() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": "alice", "password": "password123" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.get("password_hash").is_none());
        assert_eq!(body["can_be_contacted"], false);

        let (status, body) = send(
            &app,
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": "kid", "password": "password123", "age": 12 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_failed");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let app = app();
        sign_up(&app, "alice").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "nope-nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "authentication_error");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let app = app();
        let (id, token) = sign_up(&app, "alice").await;

        let (status, _) = send(&app, Method::GET, "/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);

        let (status, _) = send(&app, Method::GET, "/auth/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_anonymous_reads_but_cannot_write() {
        let app = app();
        let (_, token) = sign_up(&app, "alice").await;
        let (status, project) = send(
            &app,
            Method::POST,
            "/projects",
            Some(&token),
            Some(json!({ "title": "Website", "description": "Site", "type": "FRONTEND" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/projects/{}", project["id"]);
        let (status, _) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::DELETE, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "unauthenticated");

        let (status, _) = send(
            &app,
            Method::POST,
            "/projects",
            None,
            Some(json!({ "title": "X", "description": "Y", "type": "IOS" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_project_type_is_bad_request() {
        let app = app();
        let (_, token) = sign_up(&app, "alice").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/projects",
            Some(&token),
            Some(json!({ "title": "Website", "description": "Site", "type": "DESKTOP" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_failed");
    }

    #[tokio::test]
    async fn test_invalid_path_id() {
        let (status, body) = send(&app(), Method::GET, "/projects/abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_id");
    }

    /// A creates "Website" and adds B; B files "Fix footer"; C is refused;
    /// B cannot edit A's issue; the project author deletes everything.
    #[tokio::test]
    async fn test_website_scenario_over_http() {
        let app = app();
        let (a_id, a) = sign_up(&app, "alice").await;
        let (b_id, b) = sign_up(&app, "bob").await;
        let (_, c) = sign_up(&app, "carol").await;

        // The author field in the body is ignored
        let (status, project) = send(
            &app,
            Method::POST,
            "/projects",
            Some(&a),
            Some(json!({
                "title": "Website",
                "description": "Company site",
                "type": "FRONTEND",
                "author": b_id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(project["author"], a_id);
        let project_uri = format!("/projects/{}", project["id"]);

        let (status, members) = send(
            &app,
            Method::GET,
            &format!("{}/contributors", project_uri),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(members["total"], 1);
        assert_eq!(members["results"][0]["user"], a_id);

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("{}/contributors", project_uri),
            Some(&a),
            Some(json!({ "user": b_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("{}/contributors", project_uri),
            Some(&a),
            Some(json!({ "user": b_id })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "duplicate_membership");

        let (status, footer) = send(
            &app,
            Method::POST,
            &format!("{}/issues", project_uri),
            Some(&b),
            Some(json!({ "title": "Fix footer", "description": "Links are broken" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(footer["author"], b_id);
        assert_eq!(footer["priority"], "LOW");
        assert_eq!(footer["tag"], "TASK");
        assert_eq!(footer["status"], "TODO");

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("{}/issues", project_uri),
            Some(&c),
            Some(json!({ "title": "Spam", "description": "Outsider" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "precondition_failed");

        let (status, header_issue) = send(
            &app,
            Method::POST,
            &format!("{}/issues", project_uri),
            Some(&a),
            Some(json!({ "title": "Header", "description": "Blurry", "priority": "HIGH" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let header_uri = format!("{}/issues/{}", project_uri, header_issue["id"]);

        let (status, body) = send(
            &app,
            Method::PUT,
            &header_uri,
            Some(&b),
            Some(json!({ "title": "Mine now" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["type"], "permission_error");

        let footer_uri = format!("{}/issues/{}", project_uri, footer["id"]);
        let (status, comment) = send(
            &app,
            Method::POST,
            &format!("{}/comments", footer_uri),
            Some(&b),
            Some(json!({ "description": "Seen on mobile" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let comment_uri = format!(
            "{}/comments/{}",
            footer_uri,
            comment["id"].as_str().unwrap()
        );

        let (status, _) = send(&app, Method::GET, &comment_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, deletion) = send(&app, Method::DELETE, &project_uri, Some(&a), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deletion, json!({ "deleted": true, "id": project["id"] }));

        let (status, _) = send(&app, Method::GET, &comment_uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_account_self_service() {
        let app = app();
        let (a_id, a) = sign_up(&app, "alice").await;
        let (_, b) = sign_up(&app, "bob").await;
        let uri = format!("/users/{}", a_id);

        let (status, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&b),
            Some(json!({ "can_be_contacted": true })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&a),
            Some(json!({ "can_data_be_shared": true, "age": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["can_data_be_shared"], true);
        assert!(body.get("age").is_none());

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&a), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], true);

        // The token outlives the account but no longer authenticates
        let (status, _) = send(&app, Method::GET, "/auth/me", Some(&a), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
