//! Origin policy and the CORS response layer.
//!
//! Every response this server emits, success or error, carries the CORS
//! headers, so a failing request never additionally breaks cross-origin
//! delivery of the failure to the caller.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::OAuthConfig;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Authorization, Content-Type, Accept";

/// Resolve the `Access-Control-Allow-Origin` value for a request.
///
/// Wildcard configuration always yields `*`. A listed origin is echoed back
/// unchanged, which is what allows credentialed cross-origin responses.
/// An unlisted origin falls back to the first configured entry rather than
/// being rejected: the policy is deliberately fail-open, matching how the
/// service has always behaved.
pub fn allowed_origin(request_origin: Option<&str>, allowed: &[String]) -> String {
    if allowed.len() == 1 && allowed[0] == "*" {
        return "*".to_string();
    }
    if let Some(origin) = request_origin {
        if allowed.iter().any(|entry| entry == origin) {
            return origin.to_string();
        }
    }
    match allowed.first() {
        Some(first) => first.clone(),
        None => "*".to_string(),
    }
}

/// Middleware stamping CORS headers on every response and short-circuiting
/// `OPTIONS` preflights with a bare 200 before routing.
pub async fn apply_cors(
    State(config): State<Arc<OAuthConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let echo = allowed_origin(origin.as_deref(), &config.allowed_origins);

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_str(&echo).unwrap_or_else(|_| HeaderValue::from_static("*")),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );

    response
}
