use clap::Parser;
use nim_proxy::config::config_search_paths;
use nim_proxy::providers::BackendPreset;
use nim_proxy::{build_router, AppState, ProxyConfig, SharedLogger};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "nim-proxy",
    about = "OpenAI-compatible chat-completions proxy for NVIDIA NIM and other backends",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Backend preset name (overrides config)
    #[arg(long)]
    provider: Option<String>,

    /// Log file path
    #[arg(long, default_value = "nim-proxy.log")]
    log_file: PathBuf,

    /// Print config search paths and exit
    #[arg(long)]
    show_config_paths: bool,

    /// Print the models the backend advertises and exit
    #[arg(long)]
    list_backend_models: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nim_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.show_config_paths {
        println!("Config search paths:");
        for (i, path) in config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        println!("  (built-in defaults when none exist)");
        return Ok(());
    }

    let mut config = ProxyConfig::find_and_load(cli.config.as_deref())?;

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(ref provider) = cli.provider {
        config.backend.name = provider.clone();
        if BackendPreset::from_name(provider).is_some() {
            config.backend.base_url = None;
            config.backend.api_key_env = None;
        }
    }

    // Validate config eagerly
    let base_url = config.effective_base_url()?;
    let api_key = match config.resolve_api_key() {
        Ok(key) => Some(key),
        Err(e) => {
            warn!("{e} Chat requests will fail with 500 until it is set.");
            None
        }
    };

    // Connect timeout only: streamed completions may legitimately run for minutes.
    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(30))
        .build()?;

    if cli.list_backend_models {
        let key = config.resolve_api_key()?;
        for id in nim_proxy::models::fetch_backend_models(&client, &base_url, &key).await? {
            println!("{id}");
        }
        return Ok(());
    }

    let logger = SharedLogger::new(&cli.log_file)?;

    info!("nim-proxy v{}", env!("CARGO_PKG_VERSION"));
    info!("  Backend:   {} ({})", config.backend.name, base_url);
    info!("  Key env:   {}", config.api_key_env());
    info!("  Port:      {}", config.port);
    info!("  Models:    {} aliases, default {}", config.models.len(), config.models.default);
    info!("  Log file:  {}", cli.log_file.display());

    logger.info(
        "startup",
        format!(
            "Starting nim-proxy backend={} base_url={} port={}",
            config.backend.name, base_url, config.port
        ),
    );

    let port = config.port;
    let state = Arc::new(AppState {
        config,
        api_key,
        client,
        logger,
    });

    let app = build_router(state);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Listening on http://{}", bind_addr);
    info!("  OPENAI_BASE_URL=http://localhost:{}/v1", port);

    axum::serve(listener, app).await?;

    Ok(())
}
