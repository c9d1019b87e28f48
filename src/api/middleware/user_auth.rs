//! Bearer token extractors resolving the acting identity

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::{User, UserId};
use crate::domain::{Actor, DomainError};

/// Extractor for the acting identity.
///
/// A request without an `Authorization` header is anonymous. A header that
/// is present but invalid is rejected, never downgraded to anonymous.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match extract_jwt_token(&parts.headers)? {
            Some(token) => {
                let user = resolve_user(&token, state).await?;
                Ok(CurrentActor(Actor::User(user)))
            }
            None => Ok(CurrentActor(Actor::Anonymous)),
        }
    }
}

/// Extractor that requires a valid JWT token and loads the account
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(&parts.headers)?.ok_or_else(|| {
            ApiError::from(DomainError::unauthenticated(
                "Authentication credentials were not provided",
            ))
        })?;
        let id = resolve_user(&token, state).await?;
        let user = state.user_service.get(id).await.map_err(ApiError::from)?;

        Ok(RequireUser(user))
    }
}

/// Validate a token and check that its account still exists
async fn resolve_user(token: &str, state: &AppState) -> Result<UserId, ApiError> {
    debug!("Validating JWT token");

    let claims = state.jwt_service.validate(token)?;
    let id = claims.user_id()?;

    let exists = state.repositories.users.exists(id).await?;
    if !exists {
        return Err(DomainError::unauthenticated("User no longer exists").into());
    }

    Ok(id)
}

/// Extract the bearer token, if any, from the Authorization header
pub fn extract_jwt_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        _ => Err(DomainError::unauthenticated(
            "Provide a JWT via 'Authorization: Bearer <token>'",
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer eyJhbGciOiJIUzI1NiJ9.test".parse().unwrap(),
        );

        let token = extract_jwt_token(&headers).unwrap();
        assert_eq!(token.as_deref(), Some("eyJhbGciOiJIUzI1NiJ9.test"));
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        assert!(extract_jwt_token(&HeaderMap::new()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_auth_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        let err = extract_jwt_token(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_trimmed_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer   token-with-spaces   ".parse().unwrap(),
        );

        let token = extract_jwt_token(&headers).unwrap();
        assert_eq!(token.as_deref(), Some("token-with-spaces"));
    }
}
