//! Command implementations.

pub mod config;
pub mod run;
pub mod stats;

use crate::config::{Config, Overrides, Settings};
use crate::output::OutputFormat;
use std::path::PathBuf;

/// Shared context for all commands.
#[derive(Debug)]
pub struct Context {
    pub config_path: PathBuf,
    pub config: Config,
    pub overrides: Overrides,
    pub output_format: OutputFormat,
}

impl Context {
    /// Validated settings for going online.
    pub fn settings(&self) -> ferry::Result<Settings> {
        Settings::resolve(&self.config, &self.overrides)
    }

    /// State directory, without requiring a token or operator.
    pub fn data_dir(&self) -> anyhow::Result<PathBuf> {
        match self
            .overrides
            .data_dir
            .clone()
            .or_else(|| self.config.data_dir.clone())
        {
            Some(dir) => Ok(dir),
            None => Config::default_data_dir(),
        }
    }
}
