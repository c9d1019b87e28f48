//! Request/response logging middleware with sensitive data redaction

use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::MatchedPath,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, enabled, info, Level};

/// Largest request body echoed into debug logs
const MAX_LOGGED_BODY: usize = 64 * 1024;
const BODY_PREVIEW_CHARS: usize = 512;

static SENSITIVE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(password|token|access_token|secret|jwt_secret|authorization)"\s*:\s*"[^"]*""#)
        .unwrap()
});

/// Log each request and its outcome.
/// `TraceLayer` owns the span; this only emits events inside it.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = extract_path(&request);
    let request_id = extract_request_id(&request);
    let headers_log = redact_headers(&request);

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        headers = %headers_log,
        "Incoming request"
    );

    let request = if enabled!(Level::DEBUG) && is_json(&request) && fits_log(&request) {
        log_json_body(request).await
    } else {
        request
    };

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}

/// Only bodies with a declared length under the limit are buffered, so
/// oversized or streamed bodies reach the handler untouched
fn fits_log(request: &Request<Body>) -> bool {
    request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .is_some_and(|len| len <= MAX_LOGGED_BODY)
}

/// Buffer a JSON body, log a redacted preview, and hand back an equivalent request
async fn log_json_body(request: Request<Body>) -> Request<Body> {
    let (parts, body) = request.into_parts();

    match to_bytes(body, MAX_LOGGED_BODY).await {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            debug!(
                body = %truncate_for_log(&redact_json_sensitive_fields(&text), BODY_PREVIEW_CHARS),
                "Request body"
            );
            Request::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            debug!(error = %e, "Request body not logged");
            Request::from_parts(parts, Body::empty())
        }
    }
}

fn is_json(request: &Request<Body>) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn extract_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

fn extract_request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

/// Redact sensitive headers for logging
fn redact_headers(request: &Request<Body>) -> String {
    let mut parts = Vec::new();

    for (name, value) in request.headers() {
        let name_str = name.as_str().to_lowercase();
        if !should_log_header(&name_str) {
            continue;
        }

        let value_str = if is_sensitive_header(&name_str) {
            "[REDACTED]"
        } else {
            value.to_str().unwrap_or("[invalid]")
        };
        parts.push(format!("{}={}", name_str, value_str));
    }

    parts.join(", ")
}

fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name,
        "authorization" | "cookie" | "set-cookie" | "proxy-authorization"
    )
}

fn should_log_header(name: &str) -> bool {
    matches!(
        name,
        "content-type"
            | "content-length"
            | "accept"
            | "user-agent"
            | "x-request-id"
            | "x-forwarded-for"
            | "authorization"
    )
}

/// Redact credential-bearing string fields in a JSON document
pub fn redact_json_sensitive_fields(json: &str) -> String {
    SENSITIVE_FIELD
        .replace_all(json, r#""$1":"[REDACTED]""#)
        .into_owned()
}

/// Truncate long strings for logging on a char boundary
fn truncate_for_log(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}...[truncated]", &s[..cut]),
    }
}
