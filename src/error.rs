//! Relay error types.
//!
//! [`RelayError`] is the central error type for the relay. Each variant
//! belongs to one failure domain, and [`RelayError::kind`] gives a stable
//! label for structured logs and metrics.
//!
//! # Propagation
//!
//! | Variant      | Raised by                  | Handling                              |
//! |--------------|----------------------------|---------------------------------------|
//! | `RemoteCall` | contract reads, log watch  | command replies with failure text     |
//! | `Store`      | subscriber store           | command reply / event broadcast abort |
//! | `Delivery`   | one `sendMessage` call     | logged, other recipients unaffected   |
//! | `Telegram`   | update polling             | logged, poller backs off              |
//! | `Config`     | startup only               | fatal                                 |

use crate::domain::ChatId;

/// Relay-wide error enum.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// RPC or provider failure while reading or watching the contract.
    #[error("remote call failed: {0}")]
    RemoteCall(String),

    /// Subscriber store backend failure.
    #[error("store error: {0}")]
    Store(String),

    /// Message delivery to a single chat failed.
    #[error("delivery to chat {chat_id} failed: {reason}")]
    Delivery {
        /// Recipient that could not be reached.
        chat_id: ChatId,
        /// Failure description returned by the transport or the Bot API.
        reason: String,
    },

    /// Bot API failure outside a delivery (e.g. `getUpdates`).
    #[error("telegram api error: {0}")]
    Telegram(String),

    /// Missing or malformed startup configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// Returns a short, stable label for this variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RemoteCall(_) => "remote_call",
            Self::Store(_) => "store",
            Self::Delivery { .. } => "delivery",
            Self::Telegram(_) => "telegram",
            Self::Config(_) => "config",
        }
    }
}

impl From<sqlx::Error> for RelayError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for RelayError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<alloy::contract::Error> for RelayError {
    fn from(err: alloy::contract::Error) -> Self {
        Self::RemoteCall(err.to_string())
    }
}

impl From<alloy::transports::TransportError> for RelayError {
    fn from(err: alloy::transports::TransportError) -> Self {
        Self::RemoteCall(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(RelayError::RemoteCall("x".into()).kind(), "remote_call");
        assert_eq!(RelayError::Store("x".into()).kind(), "store");
        assert_eq!(
            RelayError::Delivery {
                chat_id: ChatId::new(1),
                reason: "x".into(),
            }
            .kind(),
            "delivery"
        );
    }

    #[test]
    fn config_and_telegram_kinds() {
        assert_eq!(RelayError::Config("BOT_TOKEN".into()).kind(), "config");
        assert_eq!(RelayError::Telegram("409".into()).kind(), "telegram");
    }

    #[test]
    fn delivery_message_names_chat() {
        let err = RelayError::Delivery {
            chat_id: ChatId::new(-100_123),
            reason: "Forbidden: bot was blocked by the user".into(),
        };
        assert_eq!(
            err.to_string(),
            "delivery to chat -100123 failed: Forbidden: bot was blocked by the user"
        );
    }
}
