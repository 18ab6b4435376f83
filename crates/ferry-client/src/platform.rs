//! [`Platform`] implementation backed by the Bot API.

use async_trait::async_trait;
use ferry_core::{ChatId, InlineKeyboardMarkup, MessageId, Platform, Result};

use crate::TelegramClient;

#[async_trait]
impl Platform for TelegramClient {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<MessageId> {
        let mut request = self.messages().send(chat, text).html();
        if let Some(keyboard) = keyboard {
            request = request.keyboard(keyboard.clone());
        }
        Ok(request.send().await?.message_id)
    }

    async fn forward_message(
        &self,
        from: ChatId,
        message: MessageId,
        to: ChatId,
    ) -> Result<MessageId> {
        Ok(self.messages().forward(from, message, to).await?.message_id)
    }

    async fn copy_message(
        &self,
        from: ChatId,
        message: MessageId,
        to: ChatId,
    ) -> Result<MessageId> {
        Ok(self.messages().copy(from, message, to).await?.message_id)
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut request = self.messages().edit(chat, message, text).html();
        if let Some(keyboard) = keyboard {
            request = request.keyboard(keyboard.clone());
        }
        request.send().await
    }

    async fn answer_callback(&self, callback_id: &str, alert: Option<&str>) -> Result<()> {
        match alert {
            Some(text) => self.callbacks().alert(callback_id, text).await,
            None => self.callbacks().answer(callback_id).await,
        }
    }
}
