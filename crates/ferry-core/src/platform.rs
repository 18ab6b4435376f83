//! Seams to the chat platform.
//!
//! The relay core only talks to the platform through these traits, so the
//! HTTP client and the test double are interchangeable.

use async_trait::async_trait;

use crate::{ChatId, InboundEvent, InlineKeyboardMarkup, MessageId, Result};

/// Outbound calls the relay makes on the platform
#[async_trait]
pub trait Platform: Send + Sync {
    /// Send an HTML-formatted text message, optionally with an inline keyboard
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<MessageId>;

    /// Forward a message with attribution, returning the id of the new copy
    async fn forward_message(
        &self,
        from: ChatId,
        message: MessageId,
        to: ChatId,
    ) -> Result<MessageId>;

    /// Copy a message without attribution, returning the id of the new copy
    async fn copy_message(&self, from: ChatId, message: MessageId, to: ChatId)
        -> Result<MessageId>;

    /// Replace the text (and keyboard) of a message the bot sent earlier
    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<()>;

    /// Acknowledge a button click, optionally showing an alert
    async fn answer_callback(&self, callback_id: &str, alert: Option<&str>) -> Result<()>;
}

/// Source of inbound events
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Wait for the next batch of events. An empty batch is not an error.
    async fn next_batch(&self) -> Result<Vec<InboundEvent>>;
}
