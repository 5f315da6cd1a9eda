//! In-process subscriber store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SubscriberStore;
use crate::domain::ChatId;
use crate::error::RelayError;

/// Subscriber set held in memory behind a [`tokio::sync::RwLock`].
///
/// Same semantics as [`super::PostgresStore`], without durability.
#[derive(Debug, Default)]
pub struct MemoryStore {
    chats: RwLock<BTreeSet<ChatId>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `chats`.
    #[must_use]
    pub fn with_chats(chats: impl IntoIterator<Item = ChatId>) -> Self {
        Self {
            chats: RwLock::new(chats.into_iter().collect()),
        }
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn add(&self, chat_id: ChatId) -> Result<bool, RelayError> {
        Ok(self.chats.write().await.insert(chat_id))
    }

    async fn remove(&self, chat_id: ChatId) -> Result<bool, RelayError> {
        Ok(self.chats.write().await.remove(&chat_id))
    }

    async fn list_all(&self) -> Result<Vec<ChatId>, RelayError> {
        Ok(self.chats.read().await.iter().copied().collect())
    }

    async fn count(&self) -> Result<u64, RelayError> {
        Ok(u64::try_from(self.chats.read().await.len()).unwrap_or(u64::MAX))
    }
}
