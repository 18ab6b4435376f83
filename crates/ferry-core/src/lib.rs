//! Core types and traits for the ferry relay bot.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - **Types**: ids, Bot API wire types, the inbound event model and the
//!   access/challenge/statistics data model
//! - **Errors**: [`FerryError`] and its recovery taxonomy [`ErrorKind`]
//! - **Platform**: the [`Platform`] and [`UpdateSource`] traits the relay
//!   core is written against
//!
//! # Example
//!
//! ```rust,ignore
//! use ferry_core::{InboundEvent, EventKind, Update};
//!
//! fn describe(update: Update) {
//!     if let Some(event) = InboundEvent::from_update(update) {
//!         if let EventKind::Command { name, .. } = &event.kind {
//!             println!("{} sent /{name}", event.sender.id);
//!         }
//!     }
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/ferry-core/0.1.0")]

mod error;
mod platform;
pub mod types;

pub use error::{ErrorKind, FerryError, Result};
pub use platform::{Platform, UpdateSource};
pub use types::*;
