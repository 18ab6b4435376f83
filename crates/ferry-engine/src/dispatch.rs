//! Relay flows between users and the operator.

use crate::panel;
use crate::relay::Relay;
use crate::texts;
use ferry_core::{ChatId, Counter, FerryError, InboundEvent, MessageId, Result, UserId};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info};

/// Deliveries in flight at once during a broadcast
const BROADCAST_CONCURRENCY: usize = 8;

/// Outcome of a broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients that got the message
    pub delivered: usize,
    /// Recipients that could not be reached
    pub failed: usize,
}

fn message_of(event: &InboundEvent) -> Result<MessageId> {
    event
        .message_id
        .ok_or_else(|| FerryError::Internal("event carries no message".into()))
}

/// Pass a user's message on to the operator.
///
/// The routing entry is recorded only once the forward succeeded. A failed
/// forward is reported to the sender and returned.
pub async fn relay_inbound(relay: &Relay, event: &InboundEvent) -> Result<()> {
    let sender = event.sender_id();
    if relay.access().is_owner(sender) {
        relay.notify(event.chat_id, texts::owner_usage_hint()).await;
        return Ok(());
    }

    let relayed = match forward_to_owner(relay, event).await {
        Ok(relayed) => relayed,
        Err(e) => {
            relay.notify(event.chat_id, texts::relay_failed()).await;
            return Err(e);
        }
    };

    relay.ledger().await.record_relay(relayed, sender);
    info!(user = %sender, message = %relayed, "relayed to operator");

    relay
        .notify_with(
            relay.owner_chat(),
            &texts::panel(sender, None),
            Some(&panel::keyboard(sender, false)),
        )
        .await;
    relay.notify(event.chat_id, texts::relay_delivered()).await;
    Ok(())
}

async fn forward_to_owner(relay: &Relay, event: &InboundEvent) -> Result<MessageId> {
    let message = message_of(event)?;
    let owner = relay.owner_chat();
    relay
        .platform()
        .send_message(owner, &texts::relay_header(&event.sender), None)
        .await?;
    relay
        .platform()
        .forward_message(event.chat_id, message, owner)
        .await
}

/// Deliver the operator's reply to the sender of the replied-to message
pub async fn relay_reply(relay: &Relay, event: &InboundEvent, reply_to: MessageId) -> Result<()> {
    let target = relay.ledger().await.resolve(reply_to);
    let Some(target) = target else {
        debug!(message = %reply_to, "reply to unrouted message");
        relay.notify(event.chat_id, texts::no_route()).await;
        return Ok(());
    };

    let message = message_of(event)?;
    match relay
        .platform()
        .copy_message(event.chat_id, message, ChatId::from(target))
        .await
    {
        Ok(_) => {
            relay.ledger().await.bump(Counter::Replies);
            info!(user = %target, "reply delivered");
            relay.notify(event.chat_id, texts::reply_sent()).await;
            Ok(())
        }
        Err(e) => {
            let text = if e.is_blocked_by_recipient() {
                texts::recipient_blocked(target)
            } else {
                texts::reply_failed(&e)
            };
            relay.notify(event.chat_id, &text).await;
            Err(e)
        }
    }
}

/// Send `text` to every whitelisted user.
///
/// Each recipient is tried independently; failures are only counted.
pub async fn broadcast(relay: &Relay, text: &str) -> BroadcastReport {
    let recipients: Vec<UserId> = relay.ledger().await.whitelisted();
    let formatted = texts::broadcast_body(text);
    let body = formatted.as_str();

    let outcomes: Vec<bool> = stream::iter(recipients)
        .map(|user| async move {
            match relay
                .platform()
                .send_message(ChatId::from(user), body, None)
                .await
            {
                Ok(_) => true,
                Err(e) => {
                    debug!(%user, error = %e, "broadcast delivery failed");
                    false
                }
            }
        })
        .buffer_unordered(BROADCAST_CONCURRENCY)
        .collect()
        .await;

    let delivered = outcomes.iter().filter(|&&ok| ok).count();
    let report = BroadcastReport {
        delivered,
        failed: outcomes.len() - delivered,
    };
    info!(delivered = report.delivered, failed = report.failed, "broadcast finished");
    report
}
