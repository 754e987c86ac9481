// GitHub OAuth Proxy Server
//
// Completes the OAuth code-for-token exchange that browser clients cannot do
// securely, and relays authenticated GitHub API calls with CORS injected.

use oauth_proxy::{start_server, OAuthConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = match OAuthConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("[ERROR] {err:#}");
            std::process::exit(1);
        }
    };

    println!("GitHub OAuth Proxy Server");
    println!();
    println!("[OK] Client ID: {}", config.client_id);
    println!("[OK] Client Secret: {}", "*".repeat(config.client_secret.len()));
    println!("[OK] Allowed Origins: {}", config.allowed_origins.join(", "));
    match &config.public_base_url {
        Some(base) => println!("[OK] Public base URL: {base}"),
        None => println!("[OK] Public base URL: inferred from Host header"),
    }
    println!();
    println!("[INFO] Starting server on port {}", config.port);
    println!();
    println!("[INFO] Available endpoints:");
    println!("  GET       http://localhost:{}/                  - Service info", config.port);
    println!("  GET       http://localhost:{}/health            - Health check", config.port);
    println!("  GET       http://localhost:{}/oauth/authorize   - Start OAuth flow", config.port);
    println!("  GET       http://localhost:{}/oauth/callback    - OAuth callback", config.port);
    println!("  GET/POST  http://localhost:{}/api/*             - GitHub API proxy", config.port);
    println!();

    start_server(config).await
}
