//! Bot command parsing and handling.

use chrono::Utc;
use tracing::{error, info};

use crate::chain::fetch_snapshot;
use crate::context::RelayContext;
use crate::domain::ChatId;
use crate::error::RelayError;
use crate::message::OutgoingMessage;
use crate::message::templates;

/// A recognised bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/subscribe`: add the chat to the broadcast set.
    Subscribe,
    /// `/unsubscribe`: remove the chat from the broadcast set.
    Unsubscribe,
    /// `/vapestats`: reply with the current game state.
    Status,
    /// `/test`: reply with a hit alert built from placeholder values.
    Test,
}

impl Command {
    /// Parses the leading command of a message.
    ///
    /// Accepts `/name`, `/name@bot` and trailing arguments, which are
    /// ignored. When `bot_username` is known, a command addressed to a
    /// different bot returns `None`. Anything else returns `None`.
    #[must_use]
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let body = token.strip_prefix('/')?;
        let (name, target) = match body.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (body, None),
        };

        if let (Some(target), Some(me)) = (target, bot_username) {
            if !target.eq_ignore_ascii_case(me) {
                return None;
            }
        }

        match name {
            "subscribe" => Some(Self::Subscribe),
            "unsubscribe" => Some(Self::Unsubscribe),
            "vapestats" => Some(Self::Status),
            "test" => Some(Self::Test),
            _ => None,
        }
    }

    /// Command name without the slash.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Status => "vapestats",
            Self::Test => "test",
        }
    }
}

/// Runs `command` for `chat_id` and builds the reply.
///
/// Failures are logged and turned into the matching error text; this
/// never fails.
pub async fn reply_for(ctx: &RelayContext, chat_id: ChatId, command: Command) -> OutgoingMessage {
    match command {
        Command::Subscribe => match ctx.store.add(chat_id).await {
            Ok(created) => {
                info!(%chat_id, created, "chat subscribed");
                OutgoingMessage::plain(templates::SUBSCRIBED)
            }
            Err(e) => {
                error!(%chat_id, error = %e, "subscribe failed");
                OutgoingMessage::plain(templates::SUBSCRIBE_FAILED)
            }
        },
        Command::Unsubscribe => match ctx.store.remove(chat_id).await {
            Ok(removed) => {
                info!(%chat_id, removed, "chat unsubscribed");
                OutgoingMessage::plain(templates::UNSUBSCRIBED)
            }
            Err(e) => {
                error!(%chat_id, error = %e, "unsubscribe failed");
                OutgoingMessage::plain(templates::UNSUBSCRIBE_FAILED)
            }
        },
        Command::Status => match fetch_snapshot(ctx.contract.as_ref()).await {
            Ok(snapshot) => {
                let remaining = snapshot.time_remaining(Utc::now());
                templates::status(&snapshot, remaining, &ctx.links)
            }
            Err(e) => {
                error!(%chat_id, error = %e, "status read failed");
                OutgoingMessage::plain(templates::STATUS_FAILED)
            }
        },
        Command::Test => templates::test_alert(&ctx.links),
    }
}

/// Runs `command` and sends the reply back to `chat_id`.
///
/// # Errors
///
/// Returns [`RelayError::Delivery`] if the reply could not be sent.
pub async fn handle_command(ctx: &RelayContext, chat_id: ChatId, command: Command) -> Result<(), RelayError> {
    let reply = reply_for(ctx, chat_id, command).await;
    let result = ctx.messenger.send(chat_id, &reply).await;
    ctx.metrics.record_command(result.is_ok());
    result
}
