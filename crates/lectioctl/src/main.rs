//! Lectio Control - command line verse lookup
//!
//! Resolves references against the local corpus or the configured remote
//! service, using the same configuration file as lectiod.

mod commands;
mod errors;
mod output;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::Context;
use lectio_common::{corpus, LectioConfig, ResolutionError, SourceMode, VerseService};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lectioctl")]
#[command(about = "Lectio - scripture verse lookup", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: /etc/lectio/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the configured remote service regardless of config mode
    #[arg(long, global = true, conflicts_with = "local")]
    remote: bool,

    /// Use the local corpus regardless of config mode
    #[arg(long, global = true)]
    local: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one verse: `verse gn 1 1` or `verse "gn 1:1"`
    Verse {
        book: String,
        chapter: Option<String>,
        verse: Option<String>,
    },

    /// Print a whole chapter
    Chapter { book: String, chapter: String },

    /// Search verse text (unranked)
    Search {
        query: String,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Verse of the day
    Daily {
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// A random verse (may land past the end of a short book)
    Random,

    /// List the books of the local corpus
    Books,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(LectioConfig::system_path);
    let mut config = LectioConfig::load_from(&config_path).context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.remote {
        config.mode = SourceMode::Remote;
    } else if cli.local {
        config.mode = SourceMode::Local;
    }

    let ctx = Context {
        service: VerseService::from_config(&config).context("Failed to build verse service")?,
        json: cli.json,
    };
    debug!("Verse service: {}", ctx.service.describe());

    let result = match &cli.command {
        Commands::Verse {
            book,
            chapter,
            verse,
        } => commands::verse(&ctx, book, chapter.as_deref(), verse.as_deref()).await,
        Commands::Chapter { book, chapter } => commands::chapter(&ctx, book, chapter).await,
        Commands::Search { query, limit } => commands::search(&ctx, query, *limit).await,
        Commands::Daily { date } => commands::daily(&ctx, *date).await,
        Commands::Random => commands::random(&ctx).await,
        Commands::Books => commands::books(&ctx, &corpus::init_global(config.corpus.path.clone())),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<ResolutionError>() {
            Some(err) => {
                output::print_error(err);
                std::process::exit(errors::exit_code(err.kind()));
            }
            None => Err(e),
        },
    }
}
