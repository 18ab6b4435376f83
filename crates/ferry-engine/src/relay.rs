//! Shared context handed to every handler.

use crate::access::AccessControl;
use crate::ledger::Ledger;
use ferry_core::{ChatId, InlineKeyboardMarkup, MessageId, Platform, UserId};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Platform handle, access pipeline and the single state owner
pub struct Relay {
    platform: Arc<dyn Platform>,
    access: AccessControl,
    ledger: Mutex<Ledger>,
}

impl Relay {
    /// Bundle the collaborators
    pub fn new(platform: Arc<dyn Platform>, access: AccessControl, ledger: Ledger) -> Self {
        Self {
            platform,
            access,
            ledger: Mutex::new(ledger),
        }
    }

    /// The platform
    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    /// The access pipeline
    pub const fn access(&self) -> &AccessControl {
        &self.access
    }

    /// The operator
    pub const fn owner(&self) -> UserId {
        self.access.owner()
    }

    /// The operator's private chat
    pub fn owner_chat(&self) -> ChatId {
        ChatId::from(self.owner())
    }

    /// Exclusive access to the state.
    ///
    /// Never hold the guard across a platform call.
    pub async fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().await
    }

    /// Send a message whose delivery nobody depends on; failures are logged
    pub async fn notify(&self, chat: ChatId, text: &str) -> Option<MessageId> {
        self.notify_with(chat, text, None).await
    }

    /// [`Relay::notify`] with an inline keyboard
    pub async fn notify_with(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Option<MessageId> {
        match self.platform.send_message(chat, text, keyboard).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(chat = %chat, kind = %e.kind(), error = %e, "notification not delivered");
                None
            }
        }
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("owner", &self.owner())
            .finish_non_exhaustive()
    }
}
