//! `getUpdates` long-polling loop.
//!
//! Each recognised command runs in its own task; a slow status read never
//! holds up the next poll. On shutdown the loop stops polling, waits
//! for in-flight commands to finish and confirms the last offset so a
//! restart does not replay handled updates.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use super::client::BotApi;
use super::types::Update;
use crate::backoff::backoff_delay;
use crate::context::RelayContext;
use crate::domain::ChatId;
use crate::service::{Command, handle_command};

/// Extracts the chat and command from an update, if it carries one.
#[must_use]
pub fn command_for(update: &Update, bot_username: Option<&str>) -> Option<(ChatId, Command)> {
    let message = update.any_message()?;
    let command = Command::parse(message.text.as_deref()?, bot_username)?;
    Some((ChatId::new(message.chat.id), command))
}

/// Drives the command surface.
#[derive(Debug)]
pub struct UpdatePoller {
    api: Arc<BotApi>,
    ctx: RelayContext,
    bot_username: Option<String>,
    max_backoff: Duration,
}

impl UpdatePoller {
    /// Creates a poller; `bot_username` filters `/cmd@otherbot`.
    #[must_use]
    pub fn new(api: Arc<BotApi>, ctx: RelayContext, bot_username: Option<String>, max_backoff: Duration) -> Self {
        Self {
            api,
            ctx,
            bot_username,
            max_backoff,
        }
    }

    /// Runs the loop in a background task until `shutdown` flips.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut offset: Option<i64> = None;
        let mut failures: u32 = 0;
        let mut in_flight = JoinSet::new();

        info!(bot = ?self.bot_username, "update poller started");

        loop {
            while in_flight.try_join_next().is_some() {}

            let polled = tokio::select! {
                _ = shutdown.changed() => break,
                polled = self.api.get_updates(offset) => polled,
            };

            match polled {
                Ok(updates) => {
                    failures = 0;
                    for update in updates {
                        offset = Some(update.update_id.saturating_add(1));
                        let Some((chat_id, command)) = command_for(&update, self.bot_username.as_deref()) else {
                            continue;
                        };
                        debug!(%chat_id, command = command.name(), "command received");
                        let ctx = self.ctx.clone();
                        in_flight.spawn(async move {
                            if let Err(e) = handle_command(&ctx, chat_id, command).await {
                                warn!(%chat_id, command = command.name(), error = %e, "reply not delivered");
                            }
                        });
                    }
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let delay = backoff_delay(failures, self.max_backoff);
                    warn!(error = %e, failures, delay_secs = delay.as_secs(), "getUpdates failed");
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        let pending = in_flight.len();
        if pending > 0 {
            info!(pending, "waiting for in-flight commands");
        }
        while in_flight.join_next().await.is_some() {}

        if let Some(offset) = offset {
            match self.api.confirm_offset(offset).await {
                Ok(()) => debug!(offset, "update offset confirmed"),
                Err(e) => warn!(error = %e, offset, "could not confirm update offset"),
            }
        }
        info!("update poller stopped");
    }
}
