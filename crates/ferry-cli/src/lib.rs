//! # ferry-cli
//!
//! Command-line front end for the ferry relay bot.
//!
//! - `ferrybot run` (the default) validates the token and starts long polling
//! - `ferrybot stats` prints the persisted counters without going online
//! - `ferrybot config` locates, shows or initializes the config file

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
