//! Authenticated pass-through proxy for the GitHub API.
//!
//! The gateway's whole value is injecting the bearer-credential boundary and
//! CORS headers a browser-originated call cannot supply itself: no caching,
//! no retries, every call is a fresh pass-through.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::error::{ProxyError, Result};
use crate::github::{GitHubApi, RawResponse};

use super::AppState;

/// `GET`/`POST /api/*` — relay the request to the GitHub API host with the
/// inbound bearer credential, returning the provider's status and body
/// verbatim with the content type forced to JSON.
pub async fn api_proxy(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match proxy_request(
        state.github.as_ref(),
        method,
        &path,
        query.as_deref(),
        &headers,
        body,
    )
    .await
    {
        Ok(raw) => {
            let status =
                StatusCode::from_u16(raw.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, [(CONTENT_TYPE, "application/json")], raw.body).into_response()
        }
        Err(err) => {
            warn!("API proxy error: {}", err);
            err.into_response()
        }
    }
}

/// Validate the inbound request and relay it. The `Authorization` check runs
/// before any outbound call is attempted; unsupported methods are rejected
/// outright, whatever headers they carry.
pub(crate) async fn proxy_request(
    github: &dyn GitHubApi,
    method: Method,
    path: &str,
    query: Option<&str>,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<RawResponse> {
    if method != Method::GET && method != Method::POST {
        return Err(ProxyError::MethodNotAllowed(method.to_string()));
    }

    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ProxyError::Unauthorized)?;

    // The /api prefix is already stripped by the route; reattach the leading
    // slash and the original query string.
    let mut target = format!("/{path}");
    if let Some(query) = query {
        target.push('?');
        target.push_str(query);
    }

    let (body, content_type) = if method == Method::POST {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        (Some(body), content_type)
    } else {
        (None, None)
    };

    github
        .relay(method, &target, auth_header, body, content_type.as_deref())
        .await
}
