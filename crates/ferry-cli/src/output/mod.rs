//! Output formatting for different formats.

use clap::ValueEnum;
use colored::Colorize;
use ferry::Summary;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable, with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!(
                "Unknown output format: {}\n\
                 Valid formats: pretty, json",
                s
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Render persisted statistics.
pub fn summary(summary: &Summary, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(summary)?);
    }

    let started = summary
        .stats
        .start_time
        .map_or_else(|| "never".dimmed().to_string(), |t| t.to_rfc3339());
    let rows = [
        ("Running since", started),
        ("Forwarded", summary.stats.total_messages.to_string()),
        ("Replies", summary.stats.total_replies.to_string()),
        ("Verified users", summary.stats.verified_users.to_string()),
        ("Blocked attempts", summary.stats.blocked_attempts.to_string()),
        ("Routes", summary.routes.to_string()),
        ("Whitelisted", summary.whitelisted.to_string().green().to_string()),
        ("Blacklisted", summary.blacklisted.to_string().red().to_string()),
        ("Pending", summary.pending.to_string().yellow().to_string()),
    ];

    let mut out = format!("{}\n\n", "Relay statistics".bold());
    for (label, value) in rows {
        out.push_str(&format!("  {:<18} {value}\n", format!("{label}:").bold()));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Pretty);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_json_summary() {
        let summary = Summary {
            stats: ferry::Statistics {
                total_messages: 3,
                ..ferry::Statistics::default()
            },
            routes: 2,
            whitelisted: 1,
            blacklisted: 0,
            pending: 0,
        };
        let json: serde_json::Value =
            serde_json::from_str(&summary_json(&summary)).unwrap();
        assert_eq!(json["total_messages"], 3);
        assert_eq!(json["routes"], 2);
    }

    fn summary_json(s: &Summary) -> String {
        super::summary(s, OutputFormat::Json).unwrap()
    }
}
