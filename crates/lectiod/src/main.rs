//! Lectio Daemon - read-only HTTP surface over verse resolution
//!
//! Serves /api/verse, /api/chapter, /api/search, /api/daily and /api/random
//! from the local corpus or the configured remote service.

use anyhow::{Context, Result};
use clap::Parser;
use lectio_common::{LectioConfig, VerseService};
use lectiod::server::{self, AppState};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lectiod")]
#[command(about = "Lectio daemon - scripture verse lookup over HTTP", long_about = None)]
#[command(version)]
struct Args {
    /// Config file (default: /etc/lectio/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overrides [server] bind
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(LectioConfig::system_path);
    let config = LectioConfig::load_from(&config_path).context("Failed to load configuration")?;

    // RUST_LOG wins over [log] level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Lectio Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let service = VerseService::from_config(&config).context("Failed to build verse service")?;

    // Surface corpus faults at startup; requests keep failing with 500 until fixed
    if let Err(e) = service.warm_up() {
        error!("Corpus failed to load: {}", e);
    }

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let state = AppState::new(service, config.server.search_limit);

    tokio::select! {
        result = server::run(state, &bind) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down gracefully"),
    }

    Ok(())
}
