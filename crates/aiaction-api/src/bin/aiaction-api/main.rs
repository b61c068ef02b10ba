use aiaction::{AiApp, ProviderErrorPolicy};
use aiaction_api::{ApiConfig, AppState, build_app};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// aiaction API Server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(short = 'H', long, env = "AIACTION_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "AIACTION_PORT", default_value_t = 3000)]
    port: u16,

    /// Log level (error, warn, info, debug, trace); defaults to the config file's
    #[arg(short, long, env = "AIACTION_LOG_LEVEL")]
    log_level: Option<String>,

    /// Config file path
    #[arg(short, long, env = "AIACTION_CONFIG")]
    config_file: Option<PathBuf>,

    /// PostgreSQL connection string; in-memory stores are used when absent
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// What to do when a provider returns an error (continue, propagate)
    #[arg(long, env = "AIACTION_PROVIDER_ERROR_POLICY")]
    provider_error_policy: Option<ProviderErrorPolicy>,

    /// Upper bound in seconds for a single provider call
    #[arg(long, env = "AIACTION_PROVIDER_TIMEOUT_SECS")]
    provider_timeout_secs: Option<u64>,

    /// Disable Swagger UI
    #[arg(long, env = "AIACTION_DISABLE_SWAGGER", default_value_t = false)]
    disable_swagger: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let loaded = cli
        .config_file
        .as_ref()
        .map(|path| (path, ApiConfig::load_from_file(path)));
    let mut config = match &loaded {
        Some((_, Ok(cfg))) => cfg.clone(),
        _ => ApiConfig::default(),
    };

    // Override with CLI options
    config.host = cli.host;
    config.port = cli.port;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    config.enable_swagger = !cli.disable_swagger;
    if cli.database_url.is_some() {
        config.ai.database_url = cli.database_url;
    }
    if let Some(policy) = cli.provider_error_policy {
        config.ai.provider_error_policy = policy;
    }
    if cli.provider_timeout_secs.is_some() {
        config.ai.provider_timeout_secs = cli.provider_timeout_secs;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &loaded {
        Some((path, Ok(_))) => info!("Configuration loaded from: {}", path.display()),
        Some((_, Err(e))) => warn!(
            "Failed to load config file: {}. Using default configuration.",
            e
        ),
        None => {}
    }

    let addr = config.socket_addr()?;

    // Initialize the AI subsystem and application state
    info!(
        "Storage: {}",
        if config.ai.database_url.is_some() {
            "PostgreSQL"
        } else {
            "in-memory"
        }
    );
    let app = AiApp::builder()
        .config(config.ai.clone())
        .connect()
        .await?
        .build()?;
    let state = AppState::new(app)
        .with_cors(config.cors.clone())
        .with_swagger(config.enable_swagger);

    // Build application
    let router = build_app(state);

    // Start server
    info!("Starting server on: {}", addr);
    if config.enable_swagger {
        info!("Swagger UI: http://{}/swagger-ui", addr);
    }
    info!("Provider error policy: {}", config.ai.provider_error_policy);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
