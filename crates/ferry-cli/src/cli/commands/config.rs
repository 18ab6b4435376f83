//! Configuration management commands.

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::{Config, DEFAULT_POLL_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::output::OutputFormat;
use anyhow::Result;
use colored::Colorize;

pub fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", ctx.config_path.display());
        }
        ConfigCommands::Show => show(&ctx)?,
        ConfigCommands::Init { force } => {
            if ctx.config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    ctx.config_path.display()
                );
            }
            Config::write_template(&ctx.config_path)?;
            println!(
                "{} Wrote {}",
                "✓".green(),
                ctx.config_path.display()
            );
        }
    }
    Ok(())
}

fn show(ctx: &Context) -> Result<()> {
    let redacted = Config {
        bot_token: ctx.config.redacted_token(),
        ..ctx.config.clone()
    };

    if ctx.output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&redacted)?);
        return Ok(());
    }

    let unset = || "(not set)".dimmed().to_string();
    println!("{}", "Configuration".bold());
    println!("  {:<20} {}", "File:", ctx.config_path.display());
    println!(
        "  {:<20} {}",
        "Bot token:",
        redacted.bot_token.unwrap_or_else(unset)
    );
    println!(
        "  {:<20} {}",
        "Operator:",
        redacted.owner_id.map_or_else(unset, |id| id.to_string())
    );
    println!("  {:<20} {:?}", "Trusted ids:", redacted.trusted_ids);
    println!(
        "  {:<20} {}",
        "Data dir:",
        ctx.data_dir()
            .map_or_else(|_| unset(), |dir| dir.display().to_string())
    );
    println!(
        "  {:<20} {}s",
        "Poll timeout:",
        redacted.poll_timeout_secs.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS)
    );
    println!(
        "  {:<20} {}s",
        "Request timeout:",
        redacted
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    );
    if let Some(url) = &redacted.api_base_url {
        println!("  {:<20} {url}", "API base URL:");
    }
    Ok(())
}
