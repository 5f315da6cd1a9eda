//! Telegram Bot API integration.
//!
//! [`BotApi`] is the HTTP client and the production
//! [`crate::service::Messenger`]. [`UpdatePoller`] long-polls
//! `getUpdates` and dispatches bot commands.

pub mod client;
pub mod poller;
pub mod types;

pub use client::BotApi;
pub use poller::{UpdatePoller, command_for};
