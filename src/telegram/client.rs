//! Bot API client over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{ApiResponse, GetUpdatesRequest, SendMessageRequest, Update, User};
use crate::config::RelayConfig;
use crate::domain::ChatId;
use crate::error::RelayError;
use crate::message::OutgoingMessage;
use crate::service::Messenger;

/// Update kinds that can carry a command.
const ALLOWED_UPDATES: [&str; 2] = ["message", "channel_post"];

/// Thin JSON client for the Telegram Bot API.
///
/// Errors never contain the request URL, which embeds the bot token.
#[derive(Clone)]
pub struct BotApi {
    http: reqwest::Client,
    /// `{api_url}/bot{token}`; secret.
    base: String,
    poll_timeout_secs: u64,
    poll_request_timeout: Duration,
}

impl std::fmt::Debug for BotApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApi")
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl BotApi {
    /// Creates a client from the relay configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("http client: {e}")))?;

        Ok(Self {
            http,
            base: format!(
                "{}/bot{}",
                config.telegram_api_url.trim_end_matches('/'),
                config.bot_token
            ),
            poll_timeout_secs: config.poll_timeout_secs,
            poll_request_timeout: config.poll_request_timeout(),
        })
    }

    async fn call<Req, Res>(&self, method: &str, body: &Req, timeout: Option<Duration>) -> Result<Res, RelayError>
    where
        Req: Serialize + Sync + ?Sized,
        Res: DeserializeOwned,
    {
        let mut request = self.http.post(format!("{}/{method}", self.base)).json(body);
        if let Some(t) = timeout {
            request = request.timeout(t);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RelayError::Telegram(format!("{method}: {}", e.without_url())))?;
        let status = response.status();
        let envelope: ApiResponse<Res> = response
            .json()
            .await
            .map_err(|e| RelayError::Telegram(format!("{method}: {status}: {}", e.without_url())))?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                description,
                error_code,
                parameters,
                ..
            } => {
                let mut reason = format!(
                    "{method}: {} {}",
                    error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                    description.unwrap_or_else(|| "no description".to_string())
                );
                if let Some(retry) = parameters.and_then(|p| p.retry_after) {
                    reason.push_str(&format!(" (retry after {retry}s)"));
                }
                Err(RelayError::Telegram(reason))
            }
        }
    }

    /// Returns the bot's own account.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Telegram`] if the token is rejected or the API
    /// is unreachable.
    pub async fn get_me(&self) -> Result<User, RelayError> {
        self.call("getMe", &serde_json::json!({}), None).await
    }

    /// Long-polls for updates starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Telegram`] on transport or API failure.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, RelayError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout_secs,
            limit: None,
            allowed_updates: ALLOWED_UPDATES.to_vec(),
        };
        self.call("getUpdates", &request, Some(self.poll_request_timeout))
            .await
    }

    /// Marks every update below `offset` as handled without waiting for
    /// new ones.
    ///
    /// Telegram only forgets updates once a later request names a higher
    /// offset, so the poller calls this once on the way out.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Telegram`] on transport or API failure.
    pub async fn confirm_offset(&self, offset: i64) -> Result<(), RelayError> {
        let request = GetUpdatesRequest {
            offset: Some(offset),
            timeout: 0,
            limit: Some(1),
            allowed_updates: ALLOWED_UPDATES.to_vec(),
        };
        let _: Vec<Update> = self.call("getUpdates", &request, None).await?;
        Ok(())
    }
}

#[async_trait]
impl Messenger for BotApi {
    async fn send(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<(), RelayError> {
        let request = SendMessageRequest::from_message(chat_id.get(), message);
        let sent: serde_json::Value = self
            .call("sendMessage", &request, None)
            .await
            .map_err(|e| RelayError::Delivery {
                chat_id,
                reason: e.to_string(),
            })?;
        debug!(%chat_id, message_id = ?sent.get("message_id"), "message sent");
        Ok(())
    }
}
