//! Event loop: every inbound event goes through the access pipeline and,
//! if it passes, to the command, button or relay handler.

use crate::access::{AccessControl, Decision};
use crate::commands::{self, Command};
use crate::dispatch;
use crate::ledger::Ledger;
use crate::panel;
use crate::relay::Relay;
use crate::store::Store;
use crate::texts;
use crate::verify::{self, Outcome};
use chrono::Utc;
use ferry_core::{EventKind, FerryError, InboundEvent, Platform, Result, UpdateSource, UserId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Version announced to the operator on startup
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const POLL_BACKOFF_MIN: Duration = Duration::from_secs(1);
const POLL_BACKOFF_MAX: Duration = Duration::from_secs(30);

/// Who runs the relay and who may skip the challenge
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// The operator
    pub owner: UserId,
    /// Users admitted without a challenge
    pub trusted_ids: Vec<UserId>,
}

/// The relay bot
#[derive(Debug)]
pub struct Bot {
    relay: Relay,
}

impl Bot {
    /// Load state from `store` and wire up the handlers.
    ///
    /// A ban list left by an older release is imported on the way.
    pub fn new(platform: Arc<dyn Platform>, store: Store, config: &BotConfig) -> Self {
        let mut ledger = Ledger::load(store.clone(), Utc::now());

        let legacy: Vec<UserId> = store
            .take_legacy_bans()
            .into_iter()
            .filter(|&user| user != config.owner)
            .collect();
        if !legacy.is_empty() {
            let added = ledger.import_bans(&legacy);
            info!(added, "legacy bans merged");
        }

        let access = AccessControl::new(config.owner, config.trusted_ids.iter().copied());
        Self {
            relay: Relay::new(platform, access, ledger),
        }
    }

    /// Shared handler context
    pub const fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Tell the operator the relay is up
    pub async fn announce(&self) {
        let summary = self.relay.ledger().await.summary();
        self.relay
            .notify(self.relay.owner_chat(), &texts::startup(VERSION, &summary))
            .await;
    }

    /// Poll `source` and handle events one at a time until `shutdown` resolves.
    ///
    /// Polling errors are retried with backoff, except a rejected token.
    pub async fn run<S>(&self, source: &S, shutdown: impl Future<Output = ()>) -> Result<()>
    where
        S: UpdateSource + ?Sized,
    {
        tokio::pin!(shutdown);
        let mut backoff = POLL_BACKOFF_MIN;
        info!(owner = %self.relay.owner(), "relay running");

        loop {
            let batch = tokio::select! {
                () = &mut shutdown => break,
                batch = source.next_batch() => batch,
            };

            match batch {
                Ok(events) => {
                    backoff = POLL_BACKOFF_MIN;
                    for event in events {
                        self.process(event).await;
                    }
                }
                Err(FerryError::Unauthorized) => return Err(FerryError::Unauthorized),
                Err(e) => {
                    warn!(kind = %e.kind(), error = %e, retry_in = ?backoff, "polling failed");
                    tokio::select! {
                        () = &mut shutdown => break,
                        () = tokio::time::sleep(backoff) => {}
                    }
                    backoff = (backoff * 2).min(POLL_BACKOFF_MAX);
                }
            }
        }

        info!("relay stopped");
        Ok(())
    }

    /// Handle one event, logging instead of returning any failure
    pub async fn process(&self, event: InboundEvent) {
        let user = event.sender_id();
        if let Err(e) = self.handle(&event).await {
            error!(%user, kind = %e.kind(), error = %e, "event handling failed");
        }
    }

    /// Handle one event
    pub async fn handle(&self, event: &InboundEvent) -> Result<()> {
        let user = event.sender_id();
        let access = self.relay.access();
        let _guard = if access.is_owner(user) {
            None
        } else {
            Some(access.lock(user).await)
        };

        let decision = {
            let mut ledger = self.relay.ledger().await;
            let mut rng = rand::thread_rng();
            access.decide(&mut ledger, user, event.text_payload(), &mut rng)
        };

        if decision != Decision::Pass {
            if let EventKind::ButtonClick { callback_id, .. } = &event.kind {
                self.acknowledge(callback_id).await;
            }
        }

        match decision {
            Decision::Pass => self.route(event).await,
            Decision::Drop => {
                debug!(%user, "event from banned user dropped");
                Ok(())
            }
            Decision::Challenge(puzzle) => {
                let sent = self
                    .relay
                    .platform()
                    .send_message(event.chat_id, &texts::challenge(&puzzle), None)
                    .await;
                if let Err(e) = sent {
                    verify::withdraw(&mut *self.relay.ledger().await, user, &puzzle);
                    return Err(e);
                }
                Ok(())
            }
            Decision::Answered(outcome) => {
                let text = match outcome {
                    Outcome::Correct => texts::verified().to_string(),
                    Outcome::Incorrect { remaining } => texts::wrong_answer(remaining),
                    Outcome::ExhaustedAndBanned => texts::banned_after_failures().to_string(),
                };
                self.relay.notify(event.chat_id, &text).await;
                Ok(())
            }
        }
    }

    /// Stop the client's spinner on a click that will not reach the panel
    async fn acknowledge(&self, callback_id: &str) {
        if let Err(e) = self.relay.platform().answer_callback(callback_id, None).await {
            debug!(error = %e, "callback acknowledgement failed");
        }
    }

    async fn route(&self, event: &InboundEvent) -> Result<()> {
        let relay = &self.relay;
        let is_owner = relay.access().is_owner(event.sender_id());

        match &event.kind {
            EventKind::Command { name, args, raw } => match Command::parse(name) {
                Some(command) => commands::handle(relay, event, command, args, raw).await,
                None if is_owner => {
                    relay.notify(event.chat_id, texts::owner_usage_hint()).await;
                    Ok(())
                }
                None => dispatch::relay_inbound(relay, event).await,
            },
            EventKind::ButtonClick { callback_id, data } => {
                panel::handle_click(relay, event, callback_id, data).await
            }
            EventKind::Reply { reply_to, .. } if is_owner => {
                dispatch::relay_reply(relay, event, *reply_to).await
            }
            EventKind::Message { .. } | EventKind::Reply { .. } => {
                dispatch::relay_inbound(relay, event).await
            }
        }
    }
}
