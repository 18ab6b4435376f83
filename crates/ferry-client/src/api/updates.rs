//! Update (long polling) endpoints.

use crate::TelegramClient;
use async_trait::async_trait;
use ferry_core::{InboundEvent, Result, Update, UpdateSource};
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Update kinds the relay subscribes to
const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

/// Update endpoints
pub struct UpdatesApi<'a> {
    client: &'a TelegramClient,
}

#[derive(Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 2],
}

impl<'a> UpdatesApi<'a> {
    pub(crate) fn new(client: &'a TelegramClient) -> Self {
        Self { client }
    }

    /// Long-poll for updates with an id of at least `offset`.
    ///
    /// Passing an offset confirms every update below it.
    pub async fn get(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: ALLOWED_UPDATES,
        };
        self.client.call_unthrottled("getUpdates", &request).await
    }
}

/// Long-polling [`UpdateSource`] that tracks the confirmation offset
pub struct UpdatePoller {
    client: TelegramClient,
    timeout: Duration,
    offset: AtomicI64,
}

impl UpdatePoller {
    /// Create a poller waiting up to `timeout` per request
    #[must_use]
    pub fn new(client: TelegramClient, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            offset: AtomicI64::new(0),
        }
    }

    /// Next update id that will be requested
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpdateSource for UpdatePoller {
    async fn next_batch(&self) -> Result<Vec<InboundEvent>> {
        let updates = self.client.updates().get(self.offset(), self.timeout).await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.fetch_max(last + 1, Ordering::SeqCst);
        }

        let received = updates.len();
        let events: Vec<InboundEvent> = updates
            .into_iter()
            .filter_map(InboundEvent::from_update)
            .collect();
        debug!(received, relevant = events.len(), "polled updates");

        Ok(events)
    }
}
