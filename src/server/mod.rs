//! HTTP server: application state, routing, and startup.

pub mod oauth_handlers;
pub mod proxy_handlers;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::OAuthConfig;
use crate::cors;
use crate::github::{GitHubApi, GitHubClient};

/// State shared across handlers: the immutable config and the provider
/// client. Nothing mutable crosses requests, so no locking is needed.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<OAuthConfig>,
    pub github: Arc<dyn GitHubApi>,
}

/// Build the router: exact-path OAuth and info routes, the `/api/*` prefix
/// route, a JSON 404 fallback, and the CORS layer that stamps every
/// response and answers OPTIONS preflights.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(oauth_handlers::service_info))
        .route("/health", get(oauth_handlers::health_check))
        .route("/oauth/authorize", get(oauth_handlers::oauth_authorize))
        .route("/oauth/login", get(oauth_handlers::oauth_authorize))
        .route("/oauth/callback", get(oauth_handlers::oauth_callback))
        .route("/api/*path", any(proxy_handlers::api_proxy))
        .fallback(oauth_handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            cors::apply_cors,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the proxy server on `0.0.0.0:<port>`.
pub async fn start_server(config: OAuthConfig) -> anyhow::Result<()> {
    let config = Arc::new(config);
    let github: Arc<dyn GitHubApi> = Arc::new(GitHubClient::new(config.clone()));
    let state = Arc::new(AppState {
        config: config.clone(),
        github,
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("[INFO] GitHub OAuth Proxy listening on {}", addr);
    info!("[INFO] Available endpoints:");
    info!("  GET       /                  - Service info");
    info!("  GET       /health            - Health check");
    info!("  GET       /oauth/authorize   - Redirect to GitHub authorization");
    info!("  GET       /oauth/callback    - OAuth callback handler");
    info!("  GET/POST  /api/*             - Authenticated GitHub API proxy");

    axum::serve(listener, app).await?;

    Ok(())
}
