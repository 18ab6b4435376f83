use serde::{Deserialize, Serialize};

use super::{ChatId, MessageId, UserId};

/// Envelope wrapping every Bot API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded
    pub ok: bool,

    /// Payload on success
    pub result: Option<T>,

    /// Human-readable error description
    #[serde(default)]
    pub description: Option<String>,

    /// Error code (mirrors the HTTP status)
    #[serde(default)]
    pub error_code: Option<u16>,

    /// Extra data attached to some errors
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

/// Additional error information
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseParameters {
    /// Seconds to wait before repeating a rate-limited request
    #[serde(default)]
    pub retry_after: Option<u64>,

    /// The group was migrated to a supergroup with this id
    #[serde(default)]
    pub migrate_to_chat_id: Option<i64>,
}

/// A platform user or bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// True for bots
    #[serde(default)]
    pub is_bot: bool,

    /// First name
    pub first_name: String,

    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,

    /// Handle without the leading `@`
    #[serde(default)]
    pub username: Option<String>,
}

/// A conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique identifier
    pub id: ChatId,

    /// `private`, `group`, `supergroup` or `channel`
    #[serde(rename = "type")]
    pub kind: String,
}

/// Formatting entity inside a text message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    /// Entity type, e.g. `bot_command`
    #[serde(rename = "type")]
    pub kind: String,

    /// Offset in UTF-16 code units
    pub offset: usize,

    /// Length in UTF-16 code units
    pub length: usize,
}

/// A message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Identifier inside the chat
    pub message_id: MessageId,

    /// Sender, empty for channel posts
    #[serde(default)]
    pub from: Option<User>,

    /// Conversation the message belongs to
    pub chat: Chat,

    /// Unix timestamp
    #[serde(default)]
    pub date: i64,

    /// Text of a text message
    #[serde(default)]
    pub text: Option<String>,

    /// Caption of a media message
    #[serde(default)]
    pub caption: Option<String>,

    /// Special entities in the text
    #[serde(default)]
    pub entities: Vec<MessageEntity>,

    /// The message this one replies to
    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,
}

impl Message {
    /// Returns true if the text starts with a bot command entity
    #[must_use]
    pub fn is_command(&self) -> bool {
        self.text.as_deref().is_some_and(|t| t.starts_with('/'))
            && self
                .entities
                .iter()
                .any(|e| e.kind == "bot_command" && e.offset == 0)
    }
}

/// Result of `copyMessage`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MessageRef {
    /// Identifier of the newly created message
    pub message_id: MessageId,
}

/// A press on an inline keyboard button
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Identifier to pass to `answerCallbackQuery`
    pub id: String,

    /// Who pressed the button
    pub from: User,

    /// Message carrying the keyboard
    #[serde(default)]
    pub message: Option<Message>,

    /// Payload attached to the button
    #[serde(default)]
    pub data: Option<String>,
}

/// An incoming update from `getUpdates`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic update identifier
    pub update_id: i64,

    /// New incoming message
    #[serde(default)]
    pub message: Option<Message>,

    /// Button press
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// Inline keyboard attached to a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    /// Rows of buttons
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// Build a keyboard with a single row
    #[must_use]
    pub fn row(buttons: Vec<InlineKeyboardButton>) -> Self {
        Self {
            inline_keyboard: vec![buttons],
        }
    }

    /// Iterate over every button
    pub fn buttons(&self) -> impl Iterator<Item = &InlineKeyboardButton> {
        self.inline_keyboard.iter().flatten()
    }
}

/// One inline keyboard button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    /// Label
    pub text: String,

    /// Payload delivered back in the callback query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl InlineKeyboardButton {
    /// Create a button that reports `data` when pressed
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_with_reply() {
        let json = r#"{
            "update_id": 10,
            "message": {
                "message_id": 77,
                "from": {"id": 1, "is_bot": false, "first_name": "Op"},
                "chat": {"id": 1, "type": "private"},
                "date": 1700000000,
                "text": "hi back",
                "reply_to_message": {
                    "message_id": 70,
                    "chat": {"id": 1, "type": "private"},
                    "date": 1699999999
                }
            }
        }"#;

        let update: Update = serde_json::from_str(json).unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.message_id, MessageId(77));
        assert_eq!(
            message.reply_to_message.as_ref().map(|m| m.message_id),
            Some(MessageId(70))
        );
        assert!(!message.is_command());
    }

    #[test]
    fn test_command_requires_entity() {
        let json = r#"{
            "message_id": 1,
            "chat": {"id": 5, "type": "private"},
            "text": "/start",
            "entities": [{"type": "bot_command", "offset": 0, "length": 6}]
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert!(message.is_command());

        let plain: Message = serde_json::from_str(
            r#"{"message_id": 2, "chat": {"id": 5, "type": "private"}, "text": "/start"}"#,
        )
        .unwrap();
        assert!(!plain.is_command());
    }

    #[test]
    fn test_error_envelope() {
        let json = r#"{"ok": false, "error_code": 429, "description": "Too Many Requests: retry after 5", "parameters": {"retry_after": 5}}"#;
        let response: ApiResponse<Message> = serde_json::from_str(json).unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.parameters.and_then(|p| p.retry_after), Some(5));
    }

    #[test]
    fn test_keyboard_skips_empty_callback_data() {
        let markup = InlineKeyboardMarkup::row(vec![InlineKeyboardButton {
            text: "plain".into(),
            callback_data: None,
        }]);
        let json = serde_json::to_string(&markup).unwrap();
        assert_eq!(json, r#"{"inline_keyboard":[[{"text":"plain"}]]}"#);
    }
}
