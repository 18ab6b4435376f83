//! Access control and message routing for the ferry relay bot.
//!
//! Every inbound event passes the [`access`] pipeline first:
//!
//! - the operator always passes
//! - banned users are dropped without a reply
//! - whitelisted and trusted users pass
//! - everyone else answers an arithmetic challenge ([`verify`]) first,
//!   three wrong answers and they are banned
//!
//! Passing events are relayed to the operator ([`dispatch`]), who answers
//! by replying to the relayed copy. The [`routing`] table maps that copy
//! back to its sender. All state lives in one [`Ledger`], written through
//! to JSON files by the [`Store`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ferry_engine::{Bot, BotConfig, Store};
//!
//! let bot = Bot::new(platform, Store::open("data")?, &BotConfig {
//!     owner: UserId(1234),
//!     trusted_ids: vec![],
//! });
//! bot.announce().await;
//! bot.run(&poller, tokio::signal::ctrl_c().map(|_| ())).await?;
//! ```

#![doc(html_root_url = "https://docs.rs/ferry-engine/0.1.0")]

mod error;

pub mod access;
pub mod bot;
pub mod commands;
pub mod dispatch;
pub mod ledger;
pub mod panel;
pub mod relay;
pub mod routing;
pub mod store;
pub mod texts;
pub mod verify;

#[cfg(test)]
mod testing;

pub use access::{AccessControl, Decision, Gate, UserLocks};
pub use bot::{Bot, BotConfig, VERSION};
pub use dispatch::BroadcastReport;
pub use error::{StoreError, StoreResult};
pub use ledger::{Ledger, Summary};
pub use relay::Relay;
pub use routing::RoutingTable;
pub use store::Store;
pub use verify::{Outcome, Puzzle};
