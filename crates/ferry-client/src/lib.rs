//! HTTP client for the Telegram Bot API.
//!
//! This crate provides [`TelegramClient`], which implements the relay's
//! [`Platform`](ferry_core::Platform) trait, and [`UpdatePoller`](api::UpdatePoller),
//! a long-polling [`UpdateSource`](ferry_core::UpdateSource).

#![doc(html_root_url = "https://docs.rs/ferry-client/0.1.0")]

mod client;
mod config;
mod platform;
pub mod api;

pub use api::UpdatePoller;
pub use client::{TelegramClient, TelegramClientBuilder};
pub use config::*;
pub use ferry_core::{FerryError, Result};
