use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of wrong answers that gets a user blacklisted
pub const MAX_FAIL_LIMIT: u32 = 3;

/// An outstanding arithmetic challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Expected answer
    pub answer: i64,

    /// Wrong answers so far, always below [`MAX_FAIL_LIMIT`]
    #[serde(default)]
    pub attempts: u32,
}

impl Challenge {
    /// A fresh challenge with no attempts used
    #[must_use]
    pub const fn new(answer: i64) -> Self {
        Self {
            answer,
            attempts: 0,
        }
    }

    /// Attempts left before the user is banned
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        MAX_FAIL_LIMIT.saturating_sub(self.attempts)
    }
}

/// Where a user stands with the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    /// The configured operator
    Owner,
    /// Allowed to relay
    Whitelisted,
    /// Silently ignored
    Blacklisted,
    /// Answering a challenge
    PendingVerification(Challenge),
    /// Never seen
    Unknown,
}

impl std::fmt::Display for AccessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Whitelisted => write!(f, "whitelisted"),
            Self::Blacklisted => write!(f, "blacklisted"),
            Self::PendingVerification(c) => write!(f, "pending ({} attempts)", c.attempts),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Monotone counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Messages relayed to the operator
    Forwarded,
    /// Operator replies delivered
    Replies,
    /// Users banned by failing the challenge
    BlockedAttempts,
    /// Users that passed the challenge
    VerifiedUsers,
}

/// Persisted statistics record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Messages relayed to the operator
    #[serde(default)]
    pub total_messages: u64,

    /// Operator replies delivered
    #[serde(default)]
    pub total_replies: u64,

    /// Users banned by failing the challenge
    #[serde(default)]
    pub blocked_attempts: u64,

    /// Users that passed the challenge
    #[serde(default)]
    pub verified_users: u64,

    /// First launch, never overwritten once set
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

impl Statistics {
    /// Increment one counter
    pub fn bump(&mut self, counter: Counter) {
        let slot = match counter {
            Counter::Forwarded => &mut self.total_messages,
            Counter::Replies => &mut self.total_replies,
            Counter::BlockedAttempts => &mut self.blocked_attempts,
            Counter::VerifiedUsers => &mut self.verified_users,
        };
        *slot = slot.saturating_add(1);
    }

    /// Current value of one counter
    #[must_use]
    pub const fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Forwarded => self.total_messages,
            Counter::Replies => self.total_replies,
            Counter::BlockedAttempts => self.blocked_attempts,
            Counter::VerifiedUsers => self.verified_users,
        }
    }

    /// Set the start time unless it is already known. Returns true if it was set.
    pub fn mark_started(&mut self, now: DateTime<Utc>) -> bool {
        if self.start_time.is_some() {
            return false;
        }
        self.start_time = Some(now);
        true
    }
}

/// One independently persisted dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKind {
    /// Relayed message id -> original sender
    Mapping,
    /// Users allowed to relay
    Whitelist,
    /// Banned users
    Blacklist,
    /// Outstanding challenges
    Pending,
    /// Counters and start time
    Statistics,
}

impl StoreKind {
    /// Every dataset
    pub const ALL: [Self; 5] = [
        Self::Mapping,
        Self::Whitelist,
        Self::Blacklist,
        Self::Pending,
        Self::Statistics,
    ];

    /// Dataset name, also the file stem on disk
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mapping => "user_mapping",
            Self::Whitelist => "whitelist",
            Self::Blacklist => "blacklist",
            Self::Pending => "pending_verify",
            Self::Statistics => "statistics",
        }
    }

    /// File name on disk
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
