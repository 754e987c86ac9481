//! GitHub provider client.
//!
//! The only two outbound calls this service makes: exchanging an
//! authorization code for an access token, and relaying authenticated API
//! requests. Both are single attempts with a bounded timeout; there is no
//! retry and no caching.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::Method;
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::config::OAuthConfig;
use crate::error::Result;

pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const GITHUB_API_URL: &str = "https://api.github.com";

const PROXY_USER_AGENT: &str = "GitHub-OAuth-Proxy/1.0";
const GITHUB_API_ACCEPT: &str = "application/vnd.github.v3+json";
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a code-for-token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResult {
    Success { access_token: String },
    Failure { error: String, description: String },
}

/// Verbatim capture of a provider API response. Non-2xx statuses are carried
/// here unchanged so the gateway can pass them through byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Seam between the HTTP handlers and the real GitHub endpoints, so tests can
/// substitute a stub provider.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResult>;

    /// Forward an authenticated API request and capture the raw response.
    /// `path_and_query` is the target path on the API host, query included.
    async fn relay(
        &self,
        method: Method,
        path_and_query: &str,
        auth_header: &str,
        body: Option<Bytes>,
        content_type: Option<&str>,
    ) -> Result<RawResponse>;
}

/// Client for GitHub's OAuth token endpoint and REST API.
pub struct GitHubClient {
    config: Arc<OAuthConfig>,
    http: reqwest::Client,
    token_url: String,
    api_base: String,
}

impl GitHubClient {
    pub fn new(config: Arc<OAuthConfig>) -> Self {
        Self::with_endpoints(config, GITHUB_TOKEN_URL, GITHUB_API_URL)
    }

    /// Construct against explicit endpoints (tests point this at a local
    /// mock server).
    pub fn with_endpoints(
        config: Arc<OAuthConfig>,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            token_url: token_url.into(),
            api_base: api_base.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResult> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .timeout(PROVIDER_TIMEOUT)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        let token: TokenResponse = response.json().await?;

        if let Some(error) = token.error {
            let description = token.error_description.unwrap_or_else(|| error.clone());
            return Ok(TokenResult::Failure { error, description });
        }

        match token.access_token {
            Some(access_token) => Ok(TokenResult::Success { access_token }),
            None => Ok(TokenResult::Failure {
                error: "no_access_token".to_string(),
                description: "No access token received".to_string(),
            }),
        }
    }

    async fn relay(
        &self,
        method: Method,
        path_and_query: &str,
        auth_header: &str,
        body: Option<Bytes>,
        content_type: Option<&str>,
    ) -> Result<RawResponse> {
        let url = format!("{}{}", self.api_base, path_and_query);
        debug!("proxying {} request to {}", method, url);

        let mut request = self
            .http
            .request(method, &url)
            .timeout(PROVIDER_TIMEOUT)
            .header(AUTHORIZATION, auth_header)
            .header(ACCEPT, GITHUB_API_ACCEPT)
            .header(USER_AGENT, PROXY_USER_AGENT);

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, content_type.unwrap_or("application/json"))
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProxyError;

    fn config() -> Arc<OAuthConfig> {
        Arc::new(OAuthConfig {
            client_id: "Ov23liTest".to_string(),
            client_secret: "shhh".to_string(),
            scopes: "repo workflow".to_string(),
            allowed_origins: vec!["*".to_string()],
            public_base_url: None,
            port: 8000,
        })
    }

    fn client_for(server: &mockito::ServerGuard) -> GitHubClient {
        GitHubClient::with_endpoints(
            config(),
            format!("{}/login/oauth/access_token", server.url()),
            server.url(),
        )
    }

    #[tokio::test]
    async fn exchange_code_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/login/oauth/access_token")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_body(r#"{"access_token":"abc123","token_type":"bearer","scope":"repo"}"#)
            .create_async()
            .await;

        let result = client_for(&server)
            .exchange_code("deadbeef", "http://localhost:8000/oauth/callback")
            .await
            .unwrap();

        assert_eq!(
            result,
            TokenResult::Success {
                access_token: "abc123".to_string()
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_code_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/login/oauth/access_token")
            .with_status(200)
            .with_body(
                r#"{"error":"bad_verification_code","error_description":"The code passed is incorrect or expired."}"#,
            )
            .create_async()
            .await;

        let result = client_for(&server)
            .exchange_code("expired", "http://localhost:8000/oauth/callback")
            .await
            .unwrap();

        assert_eq!(
            result,
            TokenResult::Failure {
                error: "bad_verification_code".to_string(),
                description: "The code passed is incorrect or expired.".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn exchange_code_without_token_or_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/login/oauth/access_token")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let result = client_for(&server)
            .exchange_code("deadbeef", "http://localhost:8000/oauth/callback")
            .await
            .unwrap();

        assert!(matches!(
            result,
            TokenResult::Failure { description, .. } if description == "No access token received"
        ));
    }

    #[tokio::test]
    async fn relay_forwards_headers_and_captures_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/user")
            .match_header("authorization", "Bearer abc123")
            .match_header("accept", GITHUB_API_ACCEPT)
            .match_header("user-agent", PROXY_USER_AGENT)
            .with_status(200)
            .with_body(r#"{"login":"octocat"}"#)
            .create_async()
            .await;

        let raw = client_for(&server)
            .relay(Method::GET, "/user", "Bearer abc123", None, None)
            .await
            .unwrap();

        assert_eq!(raw.status, 200);
        assert_eq!(raw.body, Bytes::from_static(br#"{"login":"octocat"}"#));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn relay_captures_non_2xx_verbatim() {
        let body = br#"{"message":"Not Found","documentation_url":"https://docs.github.com"}"#;
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/none/such")
            .with_status(404)
            .with_body(body.as_slice())
            .create_async()
            .await;

        let raw = client_for(&server)
            .relay(Method::GET, "/repos/none/such", "Bearer abc123", None, None)
            .await
            .unwrap();

        assert_eq!(raw.status, 404);
        assert_eq!(raw.body, Bytes::from_static(body));
    }

    #[tokio::test]
    async fn relay_posts_body_with_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/x/y/dispatches")
            .match_header("content-type", "application/json")
            .match_body(r#"{"event_type":"deploy"}"#)
            .with_status(204)
            .create_async()
            .await;

        let raw = client_for(&server)
            .relay(
                Method::POST,
                "/repos/x/y/dispatches",
                "Bearer abc123",
                Some(Bytes::from_static(br#"{"event_type":"deploy"}"#)),
                Some("application/json"),
            )
            .await
            .unwrap();

        assert_eq!(raw.status, 204);
        assert!(raw.body.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_provider_is_reported() {
        // Nothing listens on port 9; the connection fails immediately.
        let client = GitHubClient::with_endpoints(
            config(),
            "http://127.0.0.1:9/login/oauth/access_token",
            "http://127.0.0.1:9",
        );

        let err = client
            .exchange_code("deadbeef", "http://localhost:8000/oauth/callback")
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::ProviderUnreachable(_)));

        let err = client
            .relay(Method::GET, "/user", "Bearer abc123", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::ProviderUnreachable(_)));
    }
}
