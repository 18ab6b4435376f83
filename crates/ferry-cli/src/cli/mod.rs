//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, Overrides};

const DEFAULT_LOG_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_level.as_deref());
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;

    let ctx = commands::Context {
        config_path,
        config,
        overrides: Overrides {
            token: cli.token,
            owner: cli.owner,
            data_dir: cli.data_dir,
        },
        output_format: cli.output.unwrap_or_default(),
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::execute(ctx).await,
        Commands::Stats => commands::stats::execute(ctx),
        Commands::Config(args) => commands::config::execute(ctx, args),
    }
}

/// `--log-level` wins over `RUST_LOG`; logs go to stderr so `-o json` stays clean.
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
