//! Domain layer: chat identity, contract state and decoded events.
//!
//! These types carry no I/O. The chain, store and Telegram layers
//! convert to and from them at their edges.

pub mod chat_id;
pub mod hit_event;
pub mod snapshot;

pub use chat_id::ChatId;
pub use hit_event::HitEvent;
pub use snapshot::{ContractSnapshot, TimeRemaining};
