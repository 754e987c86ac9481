//! GitHub OAuth Proxy
//!
//! Server-side intermediary that completes the GitHub OAuth authorization-code
//! exchange on behalf of browser clients that cannot hold a client secret, and
//! relays authenticated GitHub API calls with CORS headers injected.
//!
//! # Features
//! - Authorization-code flow: redirect to GitHub, callback, token exchange
//! - postMessage result page delivering the token to the opener window
//! - `/api/*` pass-through proxy for bearer-authenticated GitHub API calls
//! - CORS policy with configurable allowed origins

pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod github;
pub mod server;

pub use auth::CallbackResult;
pub use config::OAuthConfig;
pub use error::{ProxyError, Result};
pub use github::{GitHubApi, GitHubClient, RawResponse, TokenResult};
pub use server::{start_server, AppState};
