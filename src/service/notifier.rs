//! Settle-all broadcast over a [`Messenger`].

use std::fmt::Debug;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::domain::ChatId;
use crate::error::RelayError;
use crate::message::OutgoingMessage;

/// Outbound chat transport.
#[async_trait]
pub trait Messenger: Send + Sync + Debug {
    /// Delivers `message` to a single chat.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Delivery`] if the chat cannot be reached or
    /// the transport rejects the message.
    async fn send(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<(), RelayError>;
}

/// Result of one delivery attempt.
#[derive(Debug)]
pub struct DeliveryOutcome {
    /// Recipient.
    pub chat_id: ChatId,
    /// `Ok` if the message was accepted.
    pub result: Result<(), RelayError>,
}

/// Per-recipient outcomes of one broadcast, in recipient order.
#[derive(Debug, Default)]
pub struct BroadcastReport {
    /// One entry per recipient.
    pub outcomes: Vec<DeliveryOutcome>,
}

impl BroadcastReport {
    /// Number of successful deliveries.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of failed deliveries.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len().saturating_sub(self.delivered())
    }
}

/// Sends `message` to every recipient concurrently and waits for all of
/// them.
///
/// A failed delivery is logged and recorded; it never cancels or retries
/// the others.
pub async fn broadcast(
    messenger: &dyn Messenger,
    message: &OutgoingMessage,
    recipients: &[ChatId],
) -> BroadcastReport {
    let attempts = recipients.iter().map(|&chat_id| async move {
        let result = messenger.send(chat_id, message).await;
        if let Err(e) = &result {
            warn!(%chat_id, error = %e, "delivery failed");
        }
        DeliveryOutcome { chat_id, result }
    });

    let report = BroadcastReport {
        outcomes: join_all(attempts).await,
    };
    debug!(
        recipients = recipients.len(),
        delivered = report.delivered(),
        failed = report.failed(),
        "broadcast settled"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingMessenger;

    #[tokio::test]
    async fn failing_recipient_does_not_affect_others() {
        let messenger = RecordingMessenger::failing_for([ChatId::new(2)]);
        let recipients = [ChatId::new(1), ChatId::new(2), ChatId::new(3)];
        let message = OutgoingMessage::plain("hello");

        let report = broadcast(&messenger, &message, &recipients).await;

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.delivered(), 2);
        assert_eq!(report.failed(), 1);
        let failed: Vec<ChatId> = report
            .outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.chat_id)
            .collect();
        assert_eq!(failed, vec![ChatId::new(2)]);

        let mut sent: Vec<ChatId> = messenger.sent().await.into_iter().map(|(c, _)| c).collect();
        sent.sort();
        assert_eq!(sent, vec![ChatId::new(1), ChatId::new(3)]);
    }

    #[tokio::test]
    async fn outcomes_follow_recipient_order() {
        let messenger = RecordingMessenger::default();
        let recipients = [ChatId::new(9), ChatId::new(4)];
        let report = broadcast(&messenger, &OutgoingMessage::plain("x"), &recipients).await;
        let order: Vec<ChatId> = report.outcomes.iter().map(|o| o.chat_id).collect();
        assert_eq!(order, recipients);
    }

    #[tokio::test]
    async fn empty_recipient_list_sends_nothing() {
        let messenger = RecordingMessenger::default();
        let report = broadcast(&messenger, &OutgoingMessage::plain("x"), &[]).await;
        assert!(report.outcomes.is_empty());
        assert!(messenger.sent().await.is_empty());
    }
}
