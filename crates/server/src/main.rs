//! vidhub server binary.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidhub_core::config::AppConfig;
use vidhub_server::bootstrap::seed_users;
use vidhub_server::{AppState, create_router};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "vidhubd")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(
        short,
        long,
        env = "VIDHUB_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,

    /// Log output format.
    #[arg(long, env = "VIDHUB_LOG_FORMAT", value_enum, default_value = "text")]
    log_format: LogFormat,
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Merge the optional TOML file with `VIDHUB_` environment variables.
fn load_config(config_path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();
    let has_config_file = std::path::Path::new(config_path).exists();

    if has_config_file {
        tracing::info!(config_path = %config_path, "Loading configuration from file");
        figment = figment.merge(Toml::file(config_path));
    } else {
        tracing::debug!("No config file found at {}", config_path);
    }

    // VIDHUB_CONFIG and VIDHUB_LOG_FORMAT only steer the binary itself.
    let has_env_config = std::env::vars().any(|(key, _)| {
        key.starts_with("VIDHUB_") && key != "VIDHUB_CONFIG" && key != "VIDHUB_LOG_FORMAT"
    });

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: vidhubd --config /path/to/config.toml\n  \
             2. Environment variables: VIDHUB_SERVER__BIND=0.0.0.0:8080 \
             VIDHUB_MEDIA__PUBLIC_BASE_URL=https://media.example.com vidhubd\n\n\
             Set VIDHUB_CONFIG env var to specify a default config file path."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("VIDHUB_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    tracing::info!("vidhub v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;

    vidhub_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    let storage = vidhub_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    tracing::info!("Storage backend initialized");

    // Fail at startup rather than on the first upload.
    storage
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!("Storage backend connectivity verified");

    let metadata = vidhub_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    tracing::info!(backend = metadata.backend_name(), "Metadata store initialized");

    let seeded = seed_users(metadata.as_ref(), &config.bootstrap).await?;
    if seeded > 0 {
        tracing::info!(seeded, "Bootstrap users created");
    }

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    let state = AppState::new(config, storage, metadata);
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
