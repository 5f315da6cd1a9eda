//! # vapegame-relay
//!
//! Telegram notification relay for the VapeGame contract.
//!
//! The relay watches one contract for `TookAHit` logs and forwards a
//! formatted alert to every subscribed chat. Chats manage their
//! subscription with bot commands; subscriptions live in PostgreSQL.
//!
//! ## Architecture
//!
//! ```text
//! EVM node (WebSocket)            Telegram (getUpdates)
//!     │                                 │
//!     ├── EventWatcher (chain/)         ├── UpdatePoller (telegram/)
//!     │                                 │
//!     ├── handle_hit_batch              ├── handle_command
//!     │        (service/)               │        (service/)
//!     │                                 │
//!     ├── ContractReader (chain/) ◄─────┤
//!     ├── SubscriberStore (store/) ◄────┤
//!     │                                 │
//!     └── broadcast ──► BotApi (telegram/) ──► sendMessage
//!
//! Ops: GET /health, GET /metrics (api/)
//! ```
//!
//! Every handler receives a [`context::RelayContext`] built once at
//! startup; there are no globals.

pub mod api;
pub mod backoff;
pub mod chain;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod message;
pub mod metrics;
pub mod service;
pub mod store;
pub mod telegram;

#[cfg(test)]
mod test_utils;
