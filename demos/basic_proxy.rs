//! Start a nim-proxy server programmatically.
//!
//! Usage:
//!   export NVIDIA_API_KEY=nvapi-your-key
//!   cargo run --example basic_proxy

use nim_proxy::{build_router, AppState, ProxyConfig, SharedLogger};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ProxyConfig::find_and_load(None)?;
    let base_url = config.effective_base_url()?;
    let api_key = config.resolve_api_key()?;

    println!("Backend: {} ({})", config.backend.name, base_url);
    println!("Aliases: {}", config.models.aliases_sorted().join(", "));

    let logger = SharedLogger::new("proxy-example.log")?;
    let client = reqwest::Client::new();

    let port = config.port;
    let state = Arc::new(AppState {
        config,
        api_key: Some(api_key),
        client,
        logger,
    });

    let app = build_router(state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("Listening on http://{}", addr);
    println!();
    println!("  curl http://localhost:{}/v1/chat/completions \\", port);
    println!("    -d '{{\"model\":\"gpt-4\",\"messages\":[{{\"role\":\"user\",\"content\":\"hi\"}}]}}'");

    axum::serve(listener, app).await?;
    Ok(())
}
