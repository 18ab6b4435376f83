//! Slash commands.

use crate::dispatch;
use crate::relay::Relay;
use crate::texts;
use ferry_core::{ErrorKind, FerryError, InboundEvent, Result, UserId};
use tracing::{debug, info};

/// Blacklist entries shown per `banlist` page
pub const BANLIST_PAGE_SIZE: usize = 20;

/// Known commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Greeting
    Start,
    /// Command overview
    Help,
    /// Counters and dataset sizes
    Stats,
    /// `banlist [page]`
    Banlist,
    /// `unban <id>`
    Unban,
    /// `broadcast <text>`
    Broadcast,
    /// Forget every route
    Clear,
}

impl Command {
    /// Look up a command by name, without the leading `/`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "stats" => Some(Self::Stats),
            "banlist" => Some(Self::Banlist),
            "unban" => Some(Self::Unban),
            "broadcast" => Some(Self::Broadcast),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }

    /// Returns true if only the operator may run it
    #[must_use]
    pub const fn operator_only(self) -> bool {
        !matches!(self, Self::Start | Self::Help)
    }
}

/// Run a command. Malformed arguments are reported back to the caller.
pub async fn handle(
    relay: &Relay,
    event: &InboundEvent,
    command: Command,
    args: &[String],
    raw: &str,
) -> Result<()> {
    let is_owner = relay.access().is_owner(event.sender_id());
    if command.operator_only() && !is_owner {
        debug!(user = %event.sender_id(), ?command, "operator command from user ignored");
        return Ok(());
    }

    let chat = event.chat_id;
    let result = match command {
        Command::Start => {
            relay
                .notify(chat, &texts::greeting(&event.sender, is_owner))
                .await;
            Ok(())
        }
        Command::Help => {
            relay.notify(chat, texts::help(is_owner)).await;
            Ok(())
        }
        Command::Stats => {
            let summary = relay.ledger().await.summary();
            relay.notify(chat, &texts::stats(&summary)).await;
            Ok(())
        }
        Command::Banlist => banlist(relay, event, args.first().map(String::as_str)).await,
        Command::Unban => unban(relay, event, args.first().map(String::as_str)).await,
        Command::Broadcast => broadcast(relay, event, command_tail(raw)).await,
        Command::Clear => {
            let count = relay.ledger().await.clear_routes();
            info!(count, "routing table cleared");
            relay.notify(chat, &texts::cleared(count)).await;
            Ok(())
        }
    };

    match result {
        Err(e) if e.kind() == ErrorKind::Validation => {
            info!(?command, error = %e, "rejected command input");
            relay.notify(chat, &texts::invalid_input(&e.to_string())).await;
            Ok(())
        }
        other => other,
    }
}

/// Everything after the command token, with line breaks kept
fn command_tail(raw: &str) -> &str {
    raw.trim()
        .split_once(char::is_whitespace)
        .map_or("", |(_, rest)| rest.trim())
}

/// Parse a user id argument
pub fn parse_user_id(arg: &str) -> Result<UserId> {
    arg.parse()
        .map_err(|_| FerryError::Validation(format!("{arg:?} is not a user id")))
}

fn parse_page(arg: &str) -> Result<usize> {
    arg.trim()
        .parse::<usize>()
        .ok()
        .filter(|&page| page >= 1)
        .ok_or_else(|| FerryError::Validation(format!("{arg:?} is not a page number")))
}

async fn banlist(relay: &Relay, event: &InboundEvent, page: Option<&str>) -> Result<()> {
    let page = page.map(parse_page).transpose()?.unwrap_or(1);
    let banned = relay.ledger().await.blacklisted();

    let text = if banned.is_empty() {
        texts::banlist_empty().to_string()
    } else {
        let pages = banned.len().div_ceil(BANLIST_PAGE_SIZE);
        if page > pages {
            texts::banlist_out_of_range(pages)
        } else {
            let start = (page - 1) * BANLIST_PAGE_SIZE;
            let end = (start + BANLIST_PAGE_SIZE).min(banned.len());
            texts::banlist_page(&banned[start..end], page, pages, banned.len())
        }
    };

    relay.notify(event.chat_id, &text).await;
    Ok(())
}

async fn unban(relay: &Relay, event: &InboundEvent, arg: Option<&str>) -> Result<()> {
    let Some(arg) = arg else {
        relay.notify(event.chat_id, texts::unban_usage()).await;
        return Ok(());
    };
    let user = parse_user_id(arg)?;

    let unbanned = {
        let _guard = relay.access().lock(user).await;
        let mut ledger = relay.ledger().await;
        ledger.is_blacklisted(user) && ledger.whitelist(user)
    };

    let text = if unbanned {
        info!(%user, "unbanned by operator");
        texts::unbanned(user)
    } else {
        texts::not_banned(user)
    };
    relay.notify(event.chat_id, &text).await;
    Ok(())
}

async fn broadcast(relay: &Relay, event: &InboundEvent, text: &str) -> Result<()> {
    let recipients = relay.ledger().await.whitelisted().len();
    if text.is_empty() {
        relay
            .notify(event.chat_id, &texts::broadcast_usage(recipients))
            .await;
        return Ok(());
    }

    let status = relay
        .notify(event.chat_id, &texts::broadcast_sending(recipients))
        .await;
    let report = dispatch::broadcast(relay, text).await;
    let done = texts::broadcast_done(report.delivered, report.failed);

    match status {
        Some(message) => {
            relay
                .platform()
                .edit_message(event.chat_id, message, &done, None)
                .await
        }
        None => {
            relay.notify(event.chat_id, &done).await;
            Ok(())
        }
    }
}
