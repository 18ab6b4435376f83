//! Command-line argument definitions using clap.

use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Telegram relay bot
///
/// Relays messages from users to one operator and routes the operator's
/// replies back. New users answer a small sum first.
#[derive(Parser, Debug)]
#[command(name = "ferrybot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Bot token (or set FERRY_BOT_TOKEN)
    #[arg(short, long, env = "FERRY_BOT_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Operator user id (or set FERRY_OWNER_ID)
    #[arg(long, env = "FERRY_OWNER_ID", global = true, allow_hyphen_values = true)]
    pub owner: Option<i64>,

    /// Config file [default: platform config dir]
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// State directory [default: platform data dir]
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `ferry_engine=trace` (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start relaying (the default)
    Run,

    /// Show persisted statistics without contacting Telegram
    Stats,

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the config file path
    Path,

    /// Print the effective configuration, token redacted
    Show,

    /// Write a commented template config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
