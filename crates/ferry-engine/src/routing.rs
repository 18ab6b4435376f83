//! Relayed-message routing table.
//!
//! Maps the id of every copy the bot placed in the operator's chat back to
//! the user who sent the original, so a reply to that copy can be routed.

use ferry_core::{MessageId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// `relayed message id -> original sender`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable {
    entries: HashMap<MessageId, UserId>,
}

impl RoutingTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `message` in the operator chat came from `sender`.
    ///
    /// Message ids are fresh per forward, so a collision means the platform
    /// reused an id; the newer entry wins and the replaced sender is returned.
    pub fn record(&mut self, message: MessageId, sender: UserId) -> Option<UserId> {
        let previous = self.entries.insert(message, sender);
        if let Some(previous) = previous {
            warn!(message = %message, %previous, %sender, "routing entry overwritten");
        }
        previous
    }

    /// Sender of the original behind `message`
    #[must_use]
    pub fn resolve(&self, message: MessageId) -> Option<UserId> {
        self.entries.get(&message).copied()
    }

    /// Remove every entry, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of relayed messages from `sender`
    #[must_use]
    pub fn count_for(&self, sender: UserId) -> usize {
        self.entries.values().filter(|&&s| s == sender).count()
    }
}
