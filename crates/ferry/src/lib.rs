//! Telegram relay bot with first-contact verification and reply routing.
//!
//! Users write to the bot, the bot forwards to one operator, and the
//! operator answers by replying to the forwarded copy. New users must solve
//! a small sum first; three wrong answers get them banned.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ferry::{Bot, BotConfig, Store, TelegramClient, UpdatePoller, UserId};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> ferry::Result<()> {
//!     let client = TelegramClient::new("123456:bot-token")?;
//!     let bot = Bot::new(
//!         Arc::new(client.clone()),
//!         Store::open("data")?,
//!         &BotConfig { owner: UserId(1234), trusted_ids: vec![] },
//!     );
//!
//!     bot.announce().await;
//!     let poller = UpdatePoller::new(client, Duration::from_secs(30));
//!     bot.run(&poller, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/ferry/0.1.0")]

// Re-export core types
pub use ferry_core::*;

// Re-export client
pub use ferry_client::{RetryConfig, TelegramClient, TelegramClientBuilder, UpdatePoller};

// Re-export the relay core
pub use ferry_engine as engine;
pub use ferry_engine::{Bot, BotConfig, Store, Summary};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;

#[cfg(test)]
mod tests {
    #[test]
    fn test_doc_root_urls_match_version() {
        let sources = [
            ("ferry", include_str!("lib.rs")),
            ("ferry-core", include_str!("../../ferry-core/src/lib.rs")),
            ("ferry-client", include_str!("../../ferry-client/src/lib.rs")),
            ("ferry-engine", include_str!("../../ferry-engine/src/lib.rs")),
        ];
        for (name, source) in sources {
            let url = format!("https://docs.rs/{name}/{}", env!("CARGO_PKG_VERSION"));
            assert!(source.contains(&url), "{name} html_root_url is stale");
        }
    }
}
