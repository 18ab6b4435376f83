//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use ferry::{FerryError, UserId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default long-poll wait
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

const TEMPLATE: &str = r#"# ferrybot configuration

# Token from @BotFather (or set FERRY_BOT_TOKEN)
bot_token = ""

# Your own numeric user id; all messages are relayed to it (or set FERRY_OWNER_ID)
owner_id = 0

# Users admitted without the verification challenge
trusted_ids = []

# Where state files are kept (defaults to the platform data directory)
# data_dir = "/var/lib/ferrybot"

# poll_timeout_secs = 30
# request_timeout_secs = 60
# api_base_url = "https://api.telegram.org"
"#;

/// Configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Bot API token.
    pub bot_token: Option<String>,

    /// Operator user id.
    pub owner_id: Option<i64>,

    /// Users exempt from the challenge.
    #[serde(default)]
    pub trusted_ids: Vec<i64>,

    /// State directory.
    pub data_dir: Option<PathBuf>,

    /// Long-poll wait in seconds.
    pub poll_timeout_secs: Option<u64>,

    /// Bot API base URL.
    pub api_base_url: Option<String>,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "ferry", "ferrybot")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

impl Config {
    /// Default config file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Default state directory.
    pub fn default_data_dir() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Load configuration from `path`. A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| FerryError::Config(format!("{}: {e}", path.display())))?;

        Ok(config)
    }

    /// Write the commented template to `path`.
    pub fn write_template(path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, TEMPLATE)?;
        Ok(())
    }

    /// The token with all but its edges masked.
    pub fn redacted_token(&self) -> Option<String> {
        self.bot_token.as_ref().map(|token| redact(token))
    }
}

fn redact(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--token` / `FERRY_BOT_TOKEN`
    pub token: Option<String>,
    /// `--owner` / `FERRY_OWNER_ID`
    pub owner: Option<i64>,
    /// `--data-dir`
    pub data_dir: Option<PathBuf>,
}

/// Everything `run` needs, merged and validated.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bot API token
    pub token: String,
    /// Operator
    pub owner: UserId,
    /// Users exempt from the challenge
    pub trusted_ids: Vec<UserId>,
    /// State directory
    pub data_dir: PathBuf,
    /// Long-poll wait
    pub poll_timeout: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// Bot API base URL override
    pub api_base_url: Option<String>,
}

impl Settings {
    /// Merge `config` with `overrides`, which take precedence.
    pub fn resolve(config: &Config, overrides: &Overrides) -> ferry::Result<Self> {
        let token = overrides
            .token
            .clone()
            .or_else(|| config.bot_token.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                FerryError::Config(
                    "bot token required: set bot_token, FERRY_BOT_TOKEN or --token".into(),
                )
            })?;

        let owner = overrides
            .owner
            .or(config.owner_id)
            .filter(|&id| id != 0)
            .ok_or_else(|| {
                FerryError::Config(
                    "operator id required: set owner_id, FERRY_OWNER_ID or --owner".into(),
                )
            })?;

        let poll_timeout = config
            .poll_timeout_secs
            .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS);
        let request_timeout = config
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout <= poll_timeout {
            return Err(FerryError::Config(format!(
                "request_timeout_secs ({request_timeout}) must exceed poll_timeout_secs ({poll_timeout})"
            )));
        }

        let data_dir = match overrides.data_dir.clone().or_else(|| config.data_dir.clone()) {
            Some(dir) => dir,
            None => Config::default_data_dir().map_err(|e| FerryError::Config(e.to_string()))?,
        };

        Ok(Self {
            token,
            owner: UserId(owner),
            trusted_ids: config.trusted_ids.iter().copied().map(UserId).collect(),
            data_dir,
            poll_timeout: Duration::from_secs(poll_timeout),
            request_timeout: Duration::from_secs(request_timeout),
            api_base_url: config.api_base_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Config {
        Config {
            bot_token: Some("123456:ABCDEFGH".into()),
            owner_id: Some(42),
            trusted_ids: vec![7, 8],
            data_dir: Some("/tmp/ferry".into()),
            ..Config::default()
        }
    }

    #[test]
    fn test_parse_template() {
        let config: Config = toml::from_str(TEMPLATE).unwrap();
        assert_eq!(config.bot_token.as_deref(), Some(""));
        assert_eq!(config.owner_id, Some(0));
        assert!(config.trusted_ids.is_empty());

        // The template alone is not runnable
        let err = Settings::resolve(&config, &Overrides::default()).unwrap_err();
        assert_eq!(err.kind(), ferry::ErrorKind::Config);
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::resolve(&full(), &Overrides::default()).unwrap();
        assert_eq!(settings.owner, UserId(42));
        assert_eq!(settings.trusted_ids, vec![UserId(7), UserId(8)]);
        assert_eq!(settings.poll_timeout, Duration::from_secs(30));
        assert_eq!(settings.request_timeout, Duration::from_secs(60));
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/ferry"));
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            token: Some("999:override".into()),
            owner: Some(5),
            data_dir: Some("/srv/ferry".into()),
        };
        let settings = Settings::resolve(&full(), &overrides).unwrap();
        assert_eq!(settings.token, "999:override");
        assert_eq!(settings.owner, UserId(5));
        assert_eq!(settings.data_dir, PathBuf::from("/srv/ferry"));
    }

    #[test]
    fn test_missing_owner_is_fatal() {
        let config = Config {
            owner_id: None,
            ..full()
        };
        let err = Settings::resolve(&config, &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("operator id required"));
    }

    #[test]
    fn test_timeouts_must_leave_room_for_polling() {
        let config = Config {
            poll_timeout_secs: Some(60),
            request_timeout_secs: Some(30),
            ..full()
        };
        assert!(Settings::resolve(&config, &Overrides::default()).is_err());
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        std::fs::write(&path, "owner_id = \"me\"").unwrap();
        assert!(Config::load(&path).is_err());

        Config::write_template(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap().owner_id, Some(0));
    }

    #[test]
    fn test_redaction() {
        assert_eq!(full().redacted_token().as_deref(), Some("1234...EFGH"));
        assert_eq!(redact("short"), "****");
    }
}
