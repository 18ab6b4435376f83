//! Message endpoints.

use crate::TelegramClient;
use ferry_core::{ChatId, InlineKeyboardMarkup, Message, MessageId, MessageRef, Result};
use serde::Serialize;

/// Message endpoints
pub struct MessagesApi<'a> {
    client: &'a TelegramClient,
}

impl<'a> MessagesApi<'a> {
    pub(crate) fn new(client: &'a TelegramClient) -> Self {
        Self { client }
    }

    /// Send a text message
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let sent = client.messages().send(ChatId(42), "<b>hi</b>").html().send().await?;
    /// println!("sent as {}", sent.message_id);
    /// ```
    #[must_use]
    pub fn send(&self, chat: ChatId, text: impl Into<String>) -> SendMessageBuilder<'a> {
        SendMessageBuilder::new(self.client, chat, text.into())
    }

    /// Forward a message, keeping the "forwarded from" attribution
    pub async fn forward(&self, from: ChatId, message: MessageId, to: ChatId) -> Result<Message> {
        #[derive(Serialize)]
        struct ForwardRequest {
            chat_id: ChatId,
            from_chat_id: ChatId,
            message_id: MessageId,
        }

        self.client
            .call(
                "forwardMessage",
                &ForwardRequest {
                    chat_id: to,
                    from_chat_id: from,
                    message_id: message,
                },
            )
            .await
    }

    /// Copy a message without attribution
    pub async fn copy(&self, from: ChatId, message: MessageId, to: ChatId) -> Result<MessageRef> {
        #[derive(Serialize)]
        struct CopyRequest {
            chat_id: ChatId,
            from_chat_id: ChatId,
            message_id: MessageId,
        }

        self.client
            .call(
                "copyMessage",
                &CopyRequest {
                    chat_id: to,
                    from_chat_id: from,
                    message_id: message,
                },
            )
            .await
    }

    /// Edit the text of a message the bot sent
    #[must_use]
    pub fn edit(
        &self,
        chat: ChatId,
        message: MessageId,
        text: impl Into<String>,
    ) -> EditMessageBuilder<'a> {
        EditMessageBuilder::new(self.client, chat, message, text.into())
    }
}

#[derive(Serialize)]
struct SendMessageRequest<'r> {
    chat_id: ChatId,
    text: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'r InlineKeyboardMarkup>,
    disable_web_page_preview: bool,
}

/// Builder for `sendMessage`
pub struct SendMessageBuilder<'a> {
    client: &'a TelegramClient,
    chat: ChatId,
    text: String,
    parse_mode: Option<&'static str>,
    keyboard: Option<InlineKeyboardMarkup>,
}

impl<'a> SendMessageBuilder<'a> {
    fn new(client: &'a TelegramClient, chat: ChatId, text: String) -> Self {
        Self {
            client,
            chat,
            text,
            parse_mode: None,
            keyboard: None,
        }
    }

    /// Interpret the text as HTML
    #[must_use]
    pub fn html(mut self) -> Self {
        self.parse_mode = Some("HTML");
        self
    }

    /// Attach an inline keyboard
    #[must_use]
    pub fn keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Send the message
    pub async fn send(self) -> Result<Message> {
        let request = SendMessageRequest {
            chat_id: self.chat,
            text: &self.text,
            parse_mode: self.parse_mode,
            reply_markup: self.keyboard.as_ref(),
            disable_web_page_preview: true,
        };

        self.client.call("sendMessage", &request).await
    }
}

#[derive(Serialize)]
struct EditMessageRequest<'r> {
    chat_id: ChatId,
    message_id: MessageId,
    text: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'r InlineKeyboardMarkup>,
}

/// Builder for `editMessageText`
pub struct EditMessageBuilder<'a> {
    client: &'a TelegramClient,
    chat: ChatId,
    message: MessageId,
    text: String,
    parse_mode: Option<&'static str>,
    keyboard: Option<InlineKeyboardMarkup>,
}

impl<'a> EditMessageBuilder<'a> {
    fn new(client: &'a TelegramClient, chat: ChatId, message: MessageId, text: String) -> Self {
        Self {
            client,
            chat,
            message,
            text,
            parse_mode: None,
            keyboard: None,
        }
    }

    /// Interpret the text as HTML
    #[must_use]
    pub fn html(mut self) -> Self {
        self.parse_mode = Some("HTML");
        self
    }

    /// Replace the inline keyboard
    #[must_use]
    pub fn keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Apply the edit
    pub async fn send(self) -> Result<()> {
        let request = EditMessageRequest {
            chat_id: self.chat,
            message_id: self.message,
            text: &self.text,
            parse_mode: self.parse_mode,
            reply_markup: self.keyboard.as_ref(),
        };

        // The API answers with the edited message, or `true` for inline messages.
        let _: serde_json::Value = self.client.call("editMessageText", &request).await?;
        Ok(())
    }
}
