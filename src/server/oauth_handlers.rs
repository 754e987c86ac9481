//! HTTP handlers for the OAuth flow and the service info endpoints.

use std::sync::Arc;

use axum::extract::{Host, Query, State};
use axum::http::{header::LOCATION, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{self, CallbackParams};
use crate::error::ProxyError;

use super::AppState;

/// Service info returned from `/`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: EndpointMap,
}

#[derive(Debug, Serialize)]
pub struct EndpointMap {
    pub health: &'static str,
    pub oauth_authorize: &'static str,
    pub oauth_callback: &'static str,
    pub api_proxy: &'static str,
}

/// Liveness body returned from `/health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
}

const SERVICE_NAME: &str = "GitHub OAuth Proxy Server";

/// `GET /`
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        endpoints: EndpointMap {
            health: "/health",
            oauth_authorize: "/oauth/authorize",
            oauth_callback: "/oauth/callback",
            api_proxy: "/api/*",
        },
    })
}

/// `GET /health`
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        service: SERVICE_NAME,
    })
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    pub state: Option<String>,
}

/// `GET /oauth/authorize` (alias `/oauth/login`) — 302 redirect to GitHub's
/// authorize URL. The client may supply its own `state`; otherwise one is
/// generated with 32 bytes of entropy.
pub async fn oauth_authorize(
    State(state): State<Arc<AppState>>,
    Host(host): Host,
    Query(params): Query<AuthorizeParams>,
) -> Response {
    let flow_state = params
        .state
        .filter(|value| !value.is_empty())
        .unwrap_or_else(auth::generate_state);

    let redirect_uri = state.config.redirect_uri(Some(&host));
    let url = auth::authorize_url(&state.config, &redirect_uri, &flow_state);

    info!("redirecting to GitHub authorize endpoint");
    (StatusCode::FOUND, [(LOCATION, url)]).into_response()
}

/// `GET /oauth/callback` — complete the flow and render the postMessage
/// result page. Failures degrade to an error page, never an HTTP error.
pub async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Host(host): Host,
    Query(params): Query<CallbackParams>,
) -> Html<String> {
    let redirect_uri = state.config.redirect_uri(Some(&host));
    let result = auth::complete_authorization(params, &redirect_uri, state.github.as_ref()).await;
    Html(auth::result_page(&result))
}

/// Fallback for unmatched paths.
pub async fn not_found() -> ProxyError {
    ProxyError::NotFound
}
