//! Operator control panel: the buttons attached below every relayed message.

use crate::relay::Relay;
use crate::texts;
use ferry_core::{
    FerryError, InboundEvent, InlineKeyboardButton, InlineKeyboardMarkup, Result, UserId,
};
use std::str::FromStr;
use tracing::{info, warn};

/// What a panel button asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// Ban the user, or lift the ban
    ToggleBan(UserId),
    /// Show the user's standing
    Info(UserId),
}

impl std::fmt::Display for PanelAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToggleBan(user) => write!(f, "ban:{user}"),
            Self::Info(user) => write!(f, "info:{user}"),
        }
    }
}

impl FromStr for PanelAction {
    type Err = FerryError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FerryError::Validation(format!("unrecognized button payload {s:?}"));
        let (action, id) = s.split_once(':').ok_or_else(invalid)?;
        let user: UserId = id.parse().map_err(|_| invalid())?;
        match action {
            "ban" => Ok(Self::ToggleBan(user)),
            "info" => Ok(Self::Info(user)),
            _ => Err(invalid()),
        }
    }
}

/// Ban toggle plus info button for `user`
#[must_use]
pub fn keyboard(user: UserId, banned: bool) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::row(vec![
        InlineKeyboardButton::callback(
            texts::ban_button(banned),
            PanelAction::ToggleBan(user).to_string(),
        ),
        InlineKeyboardButton::callback(texts::info_button(), PanelAction::Info(user).to_string()),
    ])
}

/// Handle a button click. Only the operator may use the panel.
pub async fn handle_click(
    relay: &Relay,
    event: &InboundEvent,
    callback_id: &str,
    data: &str,
) -> Result<()> {
    let actor = event.sender_id();
    if !relay.access().is_owner(actor) {
        warn!(user = %actor, "panel click from non-operator ignored");
        return relay.platform().answer_callback(callback_id, None).await;
    }

    let action = match data.parse::<PanelAction>() {
        Ok(action) => action,
        Err(e) => {
            relay
                .platform()
                .answer_callback(callback_id, Some(texts::invalid_button()))
                .await?;
            return Err(e);
        }
    };

    match action {
        PanelAction::ToggleBan(user) => toggle_ban(relay, event, callback_id, user).await,
        PanelAction::Info(user) => {
            let text = {
                let ledger = relay.ledger().await;
                texts::user_info(
                    ledger.is_whitelisted(user),
                    ledger.is_blacklisted(user),
                    ledger.routes_for(user),
                )
            };
            relay.platform().answer_callback(callback_id, Some(&text)).await
        }
    }
}

async fn toggle_ban(
    relay: &Relay,
    event: &InboundEvent,
    callback_id: &str,
    user: UserId,
) -> Result<()> {
    if relay.access().is_owner(user) {
        return relay
            .platform()
            .answer_callback(callback_id, Some(texts::cannot_ban_owner()))
            .await;
    }

    let banned = {
        let _guard = relay.access().lock(user).await;
        let mut ledger = relay.ledger().await;
        if ledger.is_blacklisted(user) {
            ledger.whitelist(user);
            false
        } else {
            ledger.blacklist(user);
            true
        }
    };
    info!(%user, banned, "ban toggled from panel");

    if let Some(message) = event.message_id {
        let text = texts::panel(user, Some(banned));
        if let Err(e) = relay
            .platform()
            .edit_message(event.chat_id, message, &text, Some(&keyboard(user, banned)))
            .await
        {
            warn!(%user, error = %e, "panel not updated");
        }
    }

    relay.platform().answer_callback(callback_id, None).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trip() {
        for action in [PanelAction::ToggleBan(UserId(20)), PanelAction::Info(UserId(-5))] {
            assert_eq!(action.to_string().parse::<PanelAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_bad_payloads() {
        for bad in ["", "ban", "ban:", "ban:abc", "kick:20", "info:1:2"] {
            let err = bad.parse::<PanelAction>().unwrap_err();
            assert_eq!(err.kind(), ferry_core::ErrorKind::Validation, "{bad}");
        }
    }

    #[test]
    fn test_keyboard_labels_follow_state() {
        let open = keyboard(UserId(3), false);
        let labels: Vec<_> = open.buttons().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, ["🚫 Ban", "📋 Info"]);

        let closed = keyboard(UserId(3), true);
        let first = closed.buttons().next().unwrap();
        assert_eq!(first.text, "✅ Unban");
        assert_eq!(first.callback_data.as_deref(), Some("ban:3"));
    }
}
