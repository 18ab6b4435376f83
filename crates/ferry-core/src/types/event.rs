//! Inbound event model.
//!
//! Platform updates are reduced to the four shapes the relay core cares
//! about: commands, plain messages, replies and button clicks.

use super::{CallbackQuery, ChatId, Message, MessageId, Update, User, UserId};

/// The identity attached to an inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    /// Platform user id
    pub id: UserId,
    /// First name
    pub first_name: String,
    /// Last name, if set
    pub last_name: Option<String>,
    /// Handle without `@`, if set
    pub username: Option<String>,
}

impl Sender {
    /// Full display name
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }

    /// `@handle`, if the user has one
    #[must_use]
    pub fn handle(&self) -> Option<String> {
        self.username.as_ref().map(|u| format!("@{u}"))
    }
}

impl From<User> for Sender {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
        }
    }
}

/// What happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `/name arg1 arg2`
    Command {
        /// Command name without `/` or `@botname`
        name: String,
        /// Whitespace-separated arguments
        args: Vec<String>,
        /// The full original text
        raw: String,
    },

    /// Any other message. `text` is `None` for stickers, photos and the like.
    Message {
        /// Text content
        text: Option<String>,
    },

    /// A message replying to an earlier message in the same chat
    Reply {
        /// The message being replied to
        reply_to: MessageId,
        /// Text content
        text: Option<String>,
    },

    /// An inline keyboard button was pressed
    ButtonClick {
        /// Identifier for `answerCallback`
        callback_id: String,
        /// Payload carried by the button
        data: String,
    },
}

/// A single inbound platform event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Who triggered it
    pub sender: Sender,
    /// Where it happened
    pub chat_id: ChatId,
    /// The message itself, or the message carrying the clicked keyboard
    pub message_id: Option<MessageId>,
    /// Payload
    pub kind: EventKind,
}

impl InboundEvent {
    /// Reduce a platform update to an event.
    ///
    /// Returns `None` for updates the relay ignores (edits, channel posts,
    /// messages without a sender, callbacks without data).
    #[must_use]
    pub fn from_update(update: Update) -> Option<Self> {
        if let Some(message) = update.message {
            return Self::from_message(message);
        }
        update.callback_query.and_then(Self::from_callback)
    }

    fn from_message(message: Message) -> Option<Self> {
        let is_command = message.is_command();
        let sender = Sender::from(message.from?);

        let kind = if is_command {
            let raw = message.text.unwrap_or_default();
            let (name, args) = parse_command(&raw);
            EventKind::Command { name, args, raw }
        } else if let Some(parent) = message.reply_to_message {
            EventKind::Reply {
                reply_to: parent.message_id,
                text: message.text,
            }
        } else {
            EventKind::Message { text: message.text }
        };

        Some(Self {
            sender,
            chat_id: message.chat.id,
            message_id: Some(message.message_id),
            kind,
        })
    }

    fn from_callback(query: CallbackQuery) -> Option<Self> {
        let data = query.data?;
        let (chat_id, message_id) = match &query.message {
            Some(m) => (m.chat.id, Some(m.message_id)),
            None => (ChatId::from(query.from.id), None),
        };

        Some(Self {
            sender: Sender::from(query.from),
            chat_id,
            message_id,
            kind: EventKind::ButtonClick {
                callback_id: query.id,
                data,
            },
        })
    }

    /// The sender's user id
    #[must_use]
    pub const fn sender_id(&self) -> UserId {
        self.sender.id
    }

    /// Text to evaluate as a challenge answer.
    ///
    /// Commands contribute their raw text; button clicks and media have none.
    #[must_use]
    pub fn text_payload(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Command { raw, .. } => Some(raw),
            EventKind::Message { text } | EventKind::Reply { text, .. } => text.as_deref(),
            EventKind::ButtonClick { .. } => None,
        }
    }
}

/// Split `/name@bot a b` into `("name", ["a", "b"])`
fn parse_command(raw: &str) -> (String, Vec<String>) {
    let mut parts = raw.split_whitespace();
    let head = parts.next().unwrap_or_default();
    let name = head
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    (name, parts.map(String::from).collect())
}
