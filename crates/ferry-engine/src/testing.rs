//! In-memory [`Platform`] that records every call.

use async_trait::async_trait;
use ferry_core::{
    ChatId, EventKind, FerryError, InboundEvent, InlineKeyboardMarkup, MessageId, Platform,
    Result, Sender, UserId,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send {
        chat: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Forward {
        from: ChatId,
        message: MessageId,
        to: ChatId,
        new_id: MessageId,
    },
    Copy {
        from: ChatId,
        message: MessageId,
        to: ChatId,
    },
    Edit {
        chat: ChatId,
        message: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Answer {
        callback_id: String,
        alert: Option<String>,
    },
}

impl Call {
    pub fn chat(&self) -> Option<ChatId> {
        match self {
            Self::Send { chat, .. } | Self::Edit { chat, .. } => Some(*chat),
            Self::Forward { to, .. } | Self::Copy { to, .. } => Some(*to),
            Self::Answer { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Send { text, .. } | Self::Edit { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Send,
    Forward,
    Copy,
}

struct Failure {
    method: Method,
    chat: ChatId,
    error: fn() -> FerryError,
}

pub struct MockPlatform {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Vec<Failure>>,
    next_id: AtomicI64,
    latency: Duration,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            calls: Mutex::default(),
            failures: Mutex::default(),
            next_id: AtomicI64::new(1000),
            latency: Duration::ZERO,
        }
    }
}

impl MockPlatform {
    /// Every call yields for `latency`, letting concurrent handlers interleave
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Make `method` calls targeting `chat` fail with `error`
    pub fn fail(&self, method: Method, chat: ChatId, error: fn() -> FerryError) {
        self.failures.lock().unwrap().push(Failure {
            method,
            chat,
            error,
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, chat: ChatId) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.chat() == Some(chat))
            .collect()
    }

    pub fn texts_to(&self, chat: ChatId) -> Vec<String> {
        self.calls_to(chat)
            .iter()
            .filter_map(|c| c.text().map(String::from))
            .collect()
    }

    pub fn last_text_to(&self, chat: ChatId) -> Option<String> {
        self.texts_to(chat).pop()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn enter(&self, method: Method, chat: ChatId) -> Result<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let failures = self.failures.lock().unwrap();
        match failures
            .iter()
            .find(|f| f.method == method && f.chat == chat)
        {
            Some(failure) => Err((failure.error)()),
            None => Ok(()),
        }
    }

    fn fresh_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<MessageId> {
        self.enter(Method::Send, chat).await?;
        self.record(Call::Send {
            chat,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(self.fresh_id())
    }

    async fn forward_message(
        &self,
        from: ChatId,
        message: MessageId,
        to: ChatId,
    ) -> Result<MessageId> {
        self.enter(Method::Forward, to).await?;
        let new_id = self.fresh_id();
        self.record(Call::Forward {
            from,
            message,
            to,
            new_id,
        });
        Ok(new_id)
    }

    async fn copy_message(
        &self,
        from: ChatId,
        message: MessageId,
        to: ChatId,
    ) -> Result<MessageId> {
        self.enter(Method::Copy, to).await?;
        self.record(Call::Copy { from, message, to });
        Ok(self.fresh_id())
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.record(Call::Edit {
            chat,
            message,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, alert: Option<&str>) -> Result<()> {
        self.record(Call::Answer {
            callback_id: callback_id.to_string(),
            alert: alert.map(String::from),
        });
        Ok(())
    }
}

fn sender(user: UserId) -> Sender {
    Sender {
        id: user,
        first_name: format!("user{user}"),
        last_name: None,
        username: None,
    }
}

static NEXT_MESSAGE: AtomicI64 = AtomicI64::new(1);

fn event(user: UserId, kind: EventKind) -> InboundEvent {
    InboundEvent {
        sender: sender(user),
        chat_id: ChatId::from(user),
        message_id: Some(MessageId(NEXT_MESSAGE.fetch_add(1, Ordering::SeqCst))),
        kind,
    }
}

/// A plain text message in `user`'s private chat
pub fn text(user: UserId, text: &str) -> InboundEvent {
    event(
        user,
        EventKind::Message {
            text: Some(text.to_string()),
        },
    )
}

/// A sticker, photo or similar
pub fn media(user: UserId) -> InboundEvent {
    event(user, EventKind::Message { text: None })
}

/// `/name args...`
pub fn command(user: UserId, raw: &str) -> InboundEvent {
    let mut parts = raw.split_whitespace();
    let name = parts
        .next()
        .unwrap_or_default()
        .trim_start_matches('/')
        .to_string();
    event(
        user,
        EventKind::Command {
            name,
            args: parts.map(String::from).collect(),
            raw: raw.to_string(),
        },
    )
}

/// A reply to `reply_to`
pub fn reply(user: UserId, reply_to: MessageId, text: &str) -> InboundEvent {
    event(
        user,
        EventKind::Reply {
            reply_to,
            text: Some(text.to_string()),
        },
    )
}

/// A click on a button of `panel`
pub fn click(user: UserId, panel: MessageId, data: &str) -> InboundEvent {
    InboundEvent {
        sender: sender(user),
        chat_id: ChatId::from(user),
        message_id: Some(panel),
        kind: EventKind::ButtonClick {
            callback_id: format!("cb-{}", NEXT_MESSAGE.fetch_add(1, Ordering::SeqCst)),
            data: data.to_string(),
        },
    }
}
