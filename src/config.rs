//! Process-lifetime configuration for the proxy.
//!
//! Built once at startup from environment variables and shared immutably
//! across requests; no component mutates it afterwards.

use anyhow::{Context, Result};

/// Hosted-platform domains that terminate TLS in front of the proxy. A Host
/// header ending in one of these means the public callback URL is https.
const SECURE_HOST_SUFFIXES: &[&str] = &[
    "herokuapp.com",
    "railway.app",
    "render.com",
    "azurewebsites.net",
    "vercel.app",
    "netlify.app",
];

/// OAuth provider configuration
///
/// `client_secret` is sensitive: it is sent only to GitHub's token endpoint
/// and must never appear in logs, banners, or responses.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Space-separated scope string requested on the authorize redirect.
    pub scopes: String,
    /// Allowed CORS origins; `["*"]` is the wildcard sentinel.
    pub allowed_origins: Vec<String>,
    /// Externally supplied public base URL. When set it is authoritative for
    /// redirect-URI construction; Host-header inference is the fallback.
    pub public_base_url: Option<String>,
    pub port: u16,
}

impl OAuthConfig {
    /// Load configuration from the environment.
    ///
    /// Required: GITHUB_CLIENT_ID, GITHUB_CLIENT_SECRET.
    /// Optional: PORT (default 8000), ALLOWED_ORIGINS (comma-separated,
    /// default `*`), PUBLIC_BASE_URL, OAUTH_SCOPES (default `repo workflow`).
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GITHUB_CLIENT_ID").context(
            "GITHUB_CLIENT_ID environment variable is required. \
             Set it with: export GITHUB_CLIENT_ID=your_client_id",
        )?;
        let client_secret = std::env::var("GITHUB_CLIENT_SECRET").context(
            "GITHUB_CLIENT_SECRET environment variable is required. \
             Set it with: export GITHUB_CLIENT_SECRET=your_client_secret",
        )?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            Err(_) => 8000,
        };

        let allowed_origins = parse_origins(
            &std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let scopes =
            std::env::var("OAUTH_SCOPES").unwrap_or_else(|_| "repo workflow".to_string());

        Ok(Self {
            client_id,
            client_secret,
            scopes,
            allowed_origins,
            public_base_url,
            port,
        })
    }

    /// Public base URL for this deployment, used to build the redirect URI.
    ///
    /// `PUBLIC_BASE_URL` wins when configured. Otherwise the base is derived
    /// from the inbound Host header, with the scheme inferred as https only
    /// for recognized hosted-platform domains. That inference is a heuristic
    /// for local development and known platforms; deployments behind other
    /// TLS-terminating proxies should set PUBLIC_BASE_URL explicitly.
    pub fn base_url(&self, host: Option<&str>) -> String {
        if let Some(base) = &self.public_base_url {
            return base.clone();
        }

        let fallback = format!("localhost:{}", self.port);
        let host = host.unwrap_or(&fallback);
        let bare_host = host.split(':').next().unwrap_or(host);

        let scheme = if SECURE_HOST_SUFFIXES
            .iter()
            .any(|suffix| bare_host.ends_with(suffix))
        {
            "https"
        } else {
            "http"
        };

        format!("{scheme}://{host}")
    }

    /// Callback redirect URI registered with the OAuth app.
    pub fn redirect_uri(&self, host: Option<&str>) -> String {
        format!("{}/oauth/callback", self.base_url(host))
    }
}

/// Split a comma-separated origin list, trimming entries and dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
