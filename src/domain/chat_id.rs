//! Type-safe chat identifier.
//!
//! [`ChatId`] is a newtype wrapper around the signed 64-bit identifier the
//! Telegram Bot API assigns to every chat. Group and channel ids are
//! negative, private chats are positive.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a chat registered to receive broadcasts.
///
/// Used as the primary key of the `chats` table and as the `chat_id`
/// parameter of every outgoing `sendMessage` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(i64);

impl ChatId {
    /// Wraps a raw chat identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw chat identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ChatId> for i64 {
    fn from(id: ChatId) -> Self {
        id.0
    }
}
