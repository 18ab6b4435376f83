//! Message texts, HTML formatted.

use crate::ledger::Summary;
use crate::verify::Puzzle;
use ferry_core::{Sender, UserId, MAX_FAIL_LIMIT};

/// Escape text for the platform's HTML mode
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Clickable mention of a user
#[must_use]
pub fn mention(sender: &Sender) -> String {
    format!(
        r#"<a href="tg://user?id={}">{}</a>"#,
        sender.id,
        escape(&sender.display_name())
    )
}

pub fn challenge(puzzle: &Puzzle) -> String {
    format!(
        "🔐 <b>Verification required</b>\n\n\
         Please answer to prove you are human:\n\n\
         👉 <b>{} + {} = ?</b>\n\n\
         You have <b>{MAX_FAIL_LIMIT}</b> attempts.",
        puzzle.a, puzzle.b
    )
}

pub fn verified() -> &'static str {
    "✅ <b>Verified</b>\n\nPlease send your message again."
}

pub fn wrong_answer(remaining: u32) -> String {
    format!("⚠️ <b>Wrong answer</b>\n\n<b>{remaining}</b> attempts left.")
}

pub fn banned_after_failures() -> &'static str {
    "🚫 <b>Verification failed</b>\n\nYou have been blocked."
}

pub fn greeting(sender: &Sender, is_owner: bool) -> String {
    if is_owner {
        format!(
            "👋 Hello, {}!\n\n\
             Messages from users appear here. Reply to a forwarded message to answer its sender.\n\n\
             Send /help for the operator commands.",
            mention(sender)
        )
    } else {
        format!(
            "👋 Hello, {}!\n\nSend a message and it will be passed on.",
            mention(sender)
        )
    }
}

pub fn help(is_owner: bool) -> &'static str {
    if is_owner {
        "📖 <b>Operator commands</b>\n\n\
         /stats - relay statistics\n\
         /banlist [page] - banned users\n\
         /unban &lt;id&gt; - lift a ban\n\
         /broadcast &lt;text&gt; - message every whitelisted user\n\
         /clear - forget reply routes\n\n\
         Reply to a forwarded message to answer its sender."
    } else {
        "📖 <b>Help</b>\n\nJust send a message. You will get a reply here."
    }
}

pub fn owner_usage_hint() -> &'static str {
    "💡 Reply to a forwarded message to answer its sender. Send /help for commands."
}

/// Sent to the operator ahead of every forwarded message
pub fn relay_header(sender: &Sender) -> String {
    let handle = sender.handle().map_or_else(|| "none".to_string(), |h| escape(&h));
    format!(
        "📩 <b>New message</b>\n\n\
         👤 {}\n\
         🆔 <code>{}</code>\n\
         🔗 {handle}\n\n\
         👇 Reply to the message below to answer",
        mention(sender),
        sender.id
    )
}

pub fn relay_delivered() -> &'static str {
    "✅ Delivered"
}

pub fn relay_failed() -> &'static str {
    "❌ Delivery failed, please try again later."
}

pub fn reply_sent() -> &'static str {
    "✅ Sent"
}

pub fn no_route() -> &'static str {
    "⚠️ No record found for that message. It may have been cleared."
}

pub fn recipient_blocked(user: UserId) -> String {
    format!("❌ User <code>{user}</code> has blocked the bot.")
}

pub fn reply_failed(error: &dyn std::fmt::Display) -> String {
    format!("❌ Sending failed: <code>{}</code>", escape(&error.to_string()))
}

pub fn panel(user: UserId, banned: Option<bool>) -> String {
    match banned {
        None => format!("⚙️ Panel | user <code>{user}</code>"),
        Some(true) => format!("⚙️ Panel | user <code>{user}</code>\nStatus: 🚫 banned"),
        Some(false) => format!("⚙️ Panel | user <code>{user}</code>\nStatus: ✅ allowed"),
    }
}

pub fn ban_button(banned: bool) -> &'static str {
    if banned {
        "✅ Unban"
    } else {
        "🚫 Ban"
    }
}

pub fn info_button() -> &'static str {
    "📋 Info"
}

pub fn user_info(whitelisted: bool, blacklisted: bool, messages: usize) -> String {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    format!(
        "Whitelisted: {}\nBlacklisted: {}\nMessages: {messages}",
        yes_no(whitelisted),
        yes_no(blacklisted)
    )
}

pub fn cannot_ban_owner() -> &'static str {
    "The operator cannot be banned."
}

pub fn invalid_button() -> &'static str {
    "This button is no longer valid."
}

pub fn stats(view: &Summary) -> String {
    let started = view
        .stats
        .start_time
        .map_or_else(|| "unknown".to_string(), |t| t.format("%Y-%m-%d").to_string());
    format!(
        "📊 <b>Statistics</b>\n\n\
         📅 Running since: <code>{started}</code>\n\
         📨 Forwarded: <b>{}</b>\n\
         💬 Replies: <b>{}</b>\n\
         ✅ Verified users: <b>{}</b>\n\
         🚫 Blocked attempts: <b>{}</b>\n\n\
         📝 Routes: <b>{}</b>\n\
         👥 Whitelist: <b>{}</b>\n\
         🚷 Blacklist: <b>{}</b>",
        view.stats.total_messages,
        view.stats.total_replies,
        view.stats.verified_users,
        view.stats.blocked_attempts,
        view.routes,
        view.whitelisted,
        view.blacklisted,
    )
}

pub fn banlist_empty() -> &'static str {
    "✅ The blacklist is empty."
}

pub fn banlist_page(ids: &[UserId], page: usize, pages: usize, total: usize) -> String {
    let lines: Vec<String> = ids.iter().map(|id| format!("• <code>{id}</code>")).collect();
    format!(
        "🚷 <b>Blacklist</b> ({total})\n\n{}\n\nPage {page}/{pages}\n\nUnban with /unban &lt;id&gt;",
        lines.join("\n")
    )
}

pub fn banlist_out_of_range(pages: usize) -> String {
    format!("⚠️ There are only {pages} pages.")
}

pub fn unban_usage() -> &'static str {
    "Usage: /unban &lt;id&gt;"
}

pub fn unbanned(user: UserId) -> String {
    format!("✅ User <code>{user}</code> unbanned")
}

pub fn not_banned(user: UserId) -> String {
    format!("⚠️ User <code>{user}</code> is not in the blacklist")
}

pub fn broadcast_usage(recipients: usize) -> String {
    format!("Usage: /broadcast &lt;text&gt;\n\nIt would reach {recipients} whitelisted users.")
}

pub fn broadcast_body(text: &str) -> String {
    format!("📢 <b>Notice</b>\n\n{}", escape(text))
}

pub fn broadcast_sending(recipients: usize) -> String {
    format!("📤 Sending to {recipients} users…")
}

pub fn broadcast_done(delivered: usize, failed: usize) -> String {
    format!("📢 <b>Broadcast finished</b>\n\n✅ Delivered: {delivered}\n❌ Failed: {failed}")
}

pub fn cleared(count: usize) -> String {
    format!("🗑️ Cleared {count} routes")
}

pub fn invalid_input(reason: &str) -> String {
    format!("⚠️ {}", escape(reason))
}

pub fn startup(version: &str, view: &Summary) -> String {
    format!(
        "🚀 <b>Relay started (v{version})</b>\n\n\
         📊 {} routes loaded\n\
         👥 {} whitelisted\n\
         🚷 {} blacklisted",
        view.routes, view.whitelisted, view.blacklisted
    )
}
