//! Livepush Server
//!
//! Run with: cargo run -- --addr :8080
//!
//! # Configuration
//!
//! Settings are read, lowest priority first, from:
//! - a TOML file (`--config`, or the first of `~/.config/livepush/config.toml`,
//!   `/etc/livepush/config.toml`, `./livepush.toml`)
//! - `LIVEPUSH_*` environment variables
//! - command line flags
//!
//! `RUST_LOG` overrides the configured log level.

use clap::Parser;
use livepush::config::{generate_default_config, Config, LoggingConfig};
use livepush::render::{PayloadKind, TimeFormat};
use livepush::{serve, AppState};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "livepush")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Push a live clock drawing to the browser over WebSocket")]
struct Cli {
    /// HTTP service address
    #[arg(long)]
    addr: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Payload pushed to clients
    #[arg(long, value_enum)]
    payload: Option<PayloadKind>,

    /// Time format used in payloads
    #[arg(long, value_enum)]
    time_format: Option<TimeFormat>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let config_path = cli.config.clone().or_else(Config::discover);
    let mut config = match &config_path {
        Some(path) => Config::load_with_env(path)?,
        None => Config::from_env(),
    };

    // Flags win over file and environment
    if let Some(addr) = cli.addr {
        config.server.addr = addr;
    }
    if let Some(payload) = cli.payload {
        config.render.payload = payload;
    }
    if let Some(format) = cli.time_format {
        config.render.time_format = format;
    }

    init_tracing(&config.logging);

    tracing::info!("Starting Livepush v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    let addr = config.socket_addr()?;
    let state = AppState::from_config(&config)?;

    tracing::info!(
        payload = %config.render.payload,
        push_interval = ?state.session.push_interval,
        ping_period = ?state.session.ping_period,
        "Sessions configured"
    );

    serve(state, addr).await?;

    tracing::info!("Livepush stopped");
    Ok(())
}

/// Initialize tracing from the logging config
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("livepush={},tower_http=debug", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
