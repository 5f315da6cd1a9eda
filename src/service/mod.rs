//! Service layer: command handling, event handling and broadcast.
//!
//! Handlers take a [`crate::context::RelayContext`] and talk to the
//! outside world only through its trait objects, so tests drive them with
//! in-process fakes.

pub mod commands;
pub mod events;
pub mod notifier;

pub use commands::{Command, handle_command, reply_for};
pub use events::{handle_hit_batch, on_log_batch};
pub use notifier::{BroadcastReport, DeliveryOutcome, Messenger, broadcast};
