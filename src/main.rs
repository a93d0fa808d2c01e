//! playlist-launcher: entry point.
//!
//! Loads configuration, initializes tracing, then runs the bootstrap pipeline:
//! check packages, install missing ones, launch the application and serve the
//! health/redirect listener.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playlist_launcher::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use playlist_launcher::pipeline;

/// Launcher for the AI Music Playlist Generator
#[derive(Parser, Debug)]
#[command(name = "playlist-launcher", version, about)]
struct Args {
    /// Path to configuration file (built-in defaults are used if the default file is absent)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level filter (e.g., "playlist_launcher=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let explicit = args.config.is_some();
    let config_path = args
        .config
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load_or_default(&config_path, explicit)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting AI Music Playlist Generator");
    tracing::info!(
        path = %config_path,
        http_port = config.http.port,
        upstream = %config.upstream.base_url(),
        required = ?config.packages.required,
        "Loaded configuration"
    );

    pipeline::run(&config).await?;

    Ok(())
}
