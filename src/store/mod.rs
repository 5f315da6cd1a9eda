//! Subscriber store: the set of chats that receive broadcasts.
//!
//! Provides the [`SubscriberStore`] trait. [`PostgresStore`] backs it with
//! the `chats` table through `sqlx::PgPool`; [`MemoryStore`] keeps the set
//! in process for tests and dry runs.
//!
//! Atomicity of concurrent add/remove on the same chat is the backend's
//! responsibility; the relay holds no lock around store calls.

pub mod memory;
pub mod postgres;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::ChatId;
use crate::error::RelayError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Persistent set of subscribed chats keyed by [`ChatId`].
#[async_trait]
pub trait SubscriberStore: Send + Sync + Debug {
    /// Adds `chat_id`. Adding an existing chat is a successful no-op.
    ///
    /// Returns `true` if a new record was created.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Store`] if the backend is unreachable or
    /// rejects the write.
    async fn add(&self, chat_id: ChatId) -> Result<bool, RelayError>;

    /// Removes `chat_id`. Removing an absent chat is a successful no-op.
    ///
    /// Returns `true` if a record was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Store`] if the backend is unreachable or
    /// rejects the delete.
    async fn remove(&self, chat_id: ChatId) -> Result<bool, RelayError>;

    /// Returns every subscribed chat, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Store`] if the backend is unreachable.
    async fn list_all(&self) -> Result<Vec<ChatId>, RelayError>;

    /// Returns the number of subscribed chats.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Store`] if the backend is unreachable.
    async fn count(&self) -> Result<u64, RelayError>;
}
