use std::time::Duration;
use thiserror::Error;

use crate::types::StoreKind;

/// Result type alias for ferry operations
pub type Result<T> = std::result::Result<T, FerryError>;

/// Coarse classification of a [`FerryError`].
///
/// Only [`ErrorKind::Config`] is fatal, and only during startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed startup configuration
    Config,
    /// An outbound platform call failed
    Transport,
    /// Reading or writing a persisted dataset failed
    Persistence,
    /// Malformed operator input (command arguments, callback payloads)
    Validation,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Transport => write!(f, "transport"),
            Self::Persistence => write!(f, "persistence"),
            Self::Validation => write!(f, "validation"),
        }
    }
}

/// Errors that can occur while relaying messages
#[derive(Error, Debug)]
pub enum FerryError {
    /// Configuration is missing or invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Authentication failed - invalid bot token
    #[error("authentication failed: invalid bot token")]
    Unauthorized,

    /// Rate limit exceeded
    #[error("rate limit exceeded, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after: Option<u64>,
    },

    /// The recipient has blocked the bot
    #[error("forbidden: bot was blocked by the user")]
    BlockedByRecipient,

    /// Chat or message not found
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the resource that wasn't found
        resource: String,
    },

    /// API returned an error response
    #[error("API error ({code}): {message}")]
    Api {
        /// Error code reported by the platform
        code: u16,
        /// Description from the platform
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A persisted dataset could not be read or written
    #[error("failed to persist {kind}: {message}")]
    Persistence {
        /// Dataset that failed
        kind: StoreKind,
        /// Underlying cause
        message: String,
    },

    /// Operator supplied malformed input
    #[error("invalid input: {0}")]
    Validation(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl FerryError {
    /// Create a persistence error for the given dataset
    pub fn persistence(kind: StoreKind, message: impl std::fmt::Display) -> Self {
        Self::Persistence {
            kind,
            message: message.to_string(),
        }
    }

    /// Map this error onto the recovery taxonomy
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Persistence { .. } => ErrorKind::Persistence,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthorized
            | Self::RateLimited { .. }
            | Self::BlockedByRecipient
            | Self::NotFound { .. }
            | Self::Api { .. }
            | Self::Http(_)
            | Self::Timeout(_)
            | Self::Json(_)
            | Self::Internal(_) => ErrorKind::Transport,
        }
    }

    /// Returns true if the error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Http(_)
        )
    }

    /// Returns true if the server refused the call without acting on it.
    ///
    /// Only these are safe to resend for calls that deliver something:
    /// a timeout or broken connection may still have been delivered.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns true if the recipient blocked the bot
    #[must_use]
    pub const fn is_blocked_by_recipient(&self) -> bool {
        matches!(self, Self::BlockedByRecipient)
    }

    /// Returns the platform error code if there is one
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::BlockedByRecipient => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}
