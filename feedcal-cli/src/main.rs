mod commands;
mod render;
mod utils;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feedcal_core::FeedCalConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "feedcal")]
#[command(version)]
#[command(about = "Keep a git-published ICS calendar in sync with an event feed")]
struct Cli {
    /// Config file to use instead of <repo>/feedcal.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository holding the calendar file
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a commented feedcal.toml into the repository
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Update and publish the calendar once
    Run,
    /// Update and publish the calendar periodically
    Schedule {
        /// Interval between runs, e.g. "2h" or "30m" (defaults to [schedule] every)
        #[arg(long)]
        every: Option<String>,

        /// Stop after this many runs
        #[arg(long)]
        runs: Option<usize>,
    },
    /// Update the calendar file without committing
    Generate,
    /// Fetch the feed and print the events it contains
    Events {
        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that everything a run needs is available
    Check {
        /// Print the effective configuration
        #[arg(long)]
        show_config: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        init_logging(cli.verbose, None)?;
        return commands::init::run(&cli.repo, cli.config.as_deref(), force);
    }

    let config = FeedCalConfig::load(&cli.repo, cli.config.as_deref());
    let log_file = config
        .as_ref()
        .ok()
        .and_then(|c| c.log_path(&cli.repo));
    init_logging(cli.verbose, log_file.as_deref())?;
    let config = config.context("Failed to load configuration")?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Run => commands::run::run(&cli.repo, config).await,
        Commands::Schedule { every, runs } => {
            commands::schedule::run(&cli.repo, config, every.as_deref(), runs).await
        }
        Commands::Generate => commands::generate::run(&cli.repo, config).await,
        Commands::Events { json } => commands::events::run(&cli.repo, config, json).await,
        Commands::Check { show_config } => commands::check::run(&cli.repo, config, show_config),
    }
}

/// Human-readable logs on stderr, plus a plain copy in `log_file` if set.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default = if verbose {
        "info,feedcal=debug,feedcal_core=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}
