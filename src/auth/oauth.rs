//! Authorization-code flow: state generation, the authorize redirect, and
//! callback completion with the postMessage result page.
//!
//! The flow is stateless across requests by design: the `state` value travels
//! through GitHub's redirect rather than server memory. The callback does
//! NOT verify that the returned `state` matches one this process issued,
//! which does not satisfy RFC 6749 section 10.12's anti-forgery guidance.
//! Preserved for parity with browser clients that supply their own state;
//! verifying would require the server-side session store this design omits.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::OAuthConfig;
use crate::github::{GitHubApi, TokenResult};

pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

/// Message tags the result page posts to the opener window. Browser-side
/// consumers match on these exact strings.
pub const SUCCESS_TAG: &str = "GITHUB_OAUTH_SUCCESS";
pub const ERROR_TAG: &str = "GITHUB_OAUTH_ERROR";

/// Generate a URL-safe state token with 32 bytes of entropy.
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(&random_bytes)
}

/// Build the GitHub authorize URL for a redirect response.
pub fn authorize_url(config: &OAuthConfig, redirect_uri: &str, state: &str) -> String {
    let mut url = url::Url::parse(GITHUB_AUTHORIZE_URL).expect("Invalid authorize URL");

    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", &config.scopes)
        .append_pair("state", state)
        .append_pair("allow_signup", "true");

    url.to_string()
}

/// Query parameters GitHub sends to the callback endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Terminal state of one callback leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    Success { access_token: String },
    Failure { error: String },
}

/// Drive the callback to its terminal state.
///
/// A provider-reported error or a missing code short-circuits without any
/// outbound call; otherwise the token exchange decides. Exchange failures
/// degrade to a `Failure` result rendered as a page, never an HTTP error.
pub async fn complete_authorization(
    params: CallbackParams,
    redirect_uri: &str,
    github: &dyn GitHubApi,
) -> CallbackResult {
    if let Some(error) = params.error {
        let description = params.error_description.unwrap_or(error);
        warn!("OAuth callback reported an error: {}", description);
        return CallbackResult::Failure {
            error: format!("OAuth error: {description}"),
        };
    }

    let Some(code) = params.code else {
        warn!("OAuth callback arrived without an authorization code");
        return CallbackResult::Failure {
            error: "No authorization code received".to_string(),
        };
    };

    match github.exchange_code(&code, redirect_uri).await {
        Ok(TokenResult::Success { access_token }) => {
            info!("access token obtained");
            CallbackResult::Success { access_token }
        }
        Ok(TokenResult::Failure { description, .. }) => {
            warn!("token exchange rejected: {}", description);
            CallbackResult::Failure {
                error: format!("Token exchange error: {description}"),
            }
        }
        Err(err) => {
            warn!("token exchange failed: {}", err);
            CallbackResult::Failure {
                error: format!("OAuth callback error: {err}"),
            }
        }
    }
}

/// Render the HTML page that delivers the result to the opener window via
/// postMessage and, on success, auto-closes after a short delay. Without an
/// opener the page asks the user to close the tab manually.
pub fn result_page(result: &CallbackResult) -> String {
    let (payload, message, status_class, icon, auto_close) = match result {
        CallbackResult::Success { access_token } => (
            json!({ "type": SUCCESS_TAG, "access_token": access_token }),
            "Authentication successful! You can close this window.".to_string(),
            "success",
            "&#10003;",
            "true",
        ),
        CallbackResult::Failure { error } => (
            json!({ "type": ERROR_TAG, "error": error }),
            format!("Authentication failed: {error}"),
            "error",
            "&#10007;",
            "false",
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>GitHub OAuth Result</title>
    <style>
        body {{
            font-family: Arial, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
            margin: 0;
            background-color: #f5f5f5;
        }}
        .container {{
            text-align: center;
            padding: 40px;
            background: white;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
            max-width: 400px;
        }}
        .success {{ color: #28a745; }}
        .error {{ color: #dc3545; }}
    </style>
</head>
<body>
    <div class="container">
        <h2 class="{status_class}">{icon} GitHub OAuth</h2>
        <p>{message}</p>
        <p id="status">Communicating with parent window...</p>
    </div>

    <script>
        const resultData = {payload};

        try {{
            if (window.opener) {{
                window.opener.postMessage(resultData, '*');
                document.getElementById('status').textContent =
                    'Result sent to parent window. You can close this tab.';
            }} else {{
                document.getElementById('status').textContent =
                    'No parent window found. Please close this tab manually.';
            }}
        }} catch (error) {{
            document.getElementById('status').textContent =
                'Error communicating with parent window: ' + error.message;
        }}

        if ({auto_close}) {{
            setTimeout(() => {{
                try {{ window.close(); }} catch (e) {{}}
            }}, 3000);
        }}
    </script>
</body>
</html>
"#
    )
}
