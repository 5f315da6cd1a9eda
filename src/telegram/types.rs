//! Subset of the Telegram Bot API wire types the relay uses.
//!
//! Unknown fields are ignored on decode; optional fields are skipped on
//! encode.

use serde::{Deserialize, Serialize};

use crate::message::{OutgoingMessage, TextFormat};

/// Envelope returned by every Bot API method.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// `true` on success.
    pub ok: bool,
    /// Method result when `ok`.
    pub result: Option<T>,
    /// Human-readable error when not `ok`.
    pub description: Option<String>,
    /// Numeric error code when not `ok`.
    pub error_code: Option<i64>,
    /// Extra hints such as a flood-control delay.
    pub parameters: Option<ResponseParameters>,
}

/// Error hints attached to a failed call.
#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    /// Seconds to wait before retrying after flood control.
    pub retry_after: Option<u64>,
}

/// The bot's own account, from `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Telegram user id.
    pub id: i64,
    /// Always `true` for `getMe`.
    #[serde(default)]
    pub is_bot: bool,
    /// Display name.
    pub first_name: String,
    /// `@` handle without the `@`.
    pub username: Option<String>,
}

/// One incoming update from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update id; the next poll offset is the last id plus one.
    pub update_id: i64,
    /// New message, if this update carries one.
    pub message: Option<Message>,
    /// New channel post, if this update carries one.
    pub channel_post: Option<Message>,
}

impl Update {
    /// The message or channel post carried by this update.
    #[must_use]
    pub fn any_message(&self) -> Option<&Message> {
        self.message.as_ref().or(self.channel_post.as_ref())
    }
}

/// A chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message id within the chat.
    pub message_id: i64,
    /// Chat the message belongs to.
    pub chat: Chat,
    /// Text body, absent for media messages.
    pub text: Option<String>,
}

/// A chat reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Chat id; negative for groups and channels.
    pub id: i64,
}

/// Parameters for `getUpdates`.
#[derive(Debug, Serialize)]
pub struct GetUpdatesRequest {
    /// First update id to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Long-poll timeout in seconds.
    pub timeout: u64,
    /// Maximum number of updates to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Update kinds to receive.
    pub allowed_updates: Vec<&'static str>,
}

/// Parameters for `sendMessage`.
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    /// Recipient chat.
    pub chat_id: i64,
    /// Message body.
    pub text: &'a str,
    /// `HTML` for formatted messages, absent for plain text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    /// Suppress the link preview card.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_web_page_preview: bool,
    /// Inline keyboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

impl<'a> SendMessageRequest<'a> {
    /// Maps an [`OutgoingMessage`] onto `sendMessage` parameters.
    #[must_use]
    pub fn from_message(chat_id: i64, message: &'a OutgoingMessage) -> Self {
        let reply_markup = (!message.buttons.is_empty()).then(|| InlineKeyboardMarkup {
            inline_keyboard: message
                .buttons
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| InlineKeyboardButton {
                            text: &b.text,
                            url: &b.url,
                        })
                        .collect()
                })
                .collect(),
        });

        Self {
            chat_id,
            text: &message.text,
            parse_mode: match message.format {
                TextFormat::Html => Some("HTML"),
                TextFormat::Plain => None,
            },
            disable_web_page_preview: message.disable_link_preview,
            reply_markup,
        }
    }
}

/// Inline keyboard attached to a message.
#[derive(Debug, Serialize)]
pub struct InlineKeyboardMarkup<'a> {
    /// Button rows.
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

/// URL button.
#[derive(Debug, Serialize)]
pub struct InlineKeyboardButton<'a> {
    /// Label.
    pub text: &'a str,
    /// Target URL.
    pub url: &'a str,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::message::UrlButton;

    #[test]
    fn html_message_maps_to_send_parameters() {
        let msg = OutgoingMessage::html("<b>hi</b>")
            .with_row(vec![UrlButton::new("A", "https://a"), UrlButton::new("B", "https://b")])
            .with_row(vec![UrlButton::new("C", "https://c")]);
        let Ok(json) = serde_json::to_value(SendMessageRequest::from_message(-100, &msg)) else {
            panic!("serialize failed");
        };

        assert_eq!(json["chat_id"], -100);
        assert_eq!(json["parse_mode"], "HTML");
        assert_eq!(json["disable_web_page_preview"], true);
        assert_eq!(json["reply_markup"]["inline_keyboard"][0][1]["url"], "https://b");
        assert_eq!(json["reply_markup"]["inline_keyboard"][1][0]["text"], "C");
    }

    #[test]
    fn plain_message_omits_optional_fields() {
        let msg = OutgoingMessage::plain("ok");
        let Ok(json) = serde_json::to_value(SendMessageRequest::from_message(1, &msg)) else {
            panic!("serialize failed");
        };
        assert!(json.get("parse_mode").is_none());
        assert!(json.get("reply_markup").is_none());
        assert!(json.get("disable_web_page_preview").is_none());
    }

    #[test]
    fn decodes_update_with_unknown_fields() {
        let raw = r#"{
            "ok": true,
            "result": [{
                "update_id": 10,
                "message": {
                    "message_id": 3,
                    "date": 1700000000,
                    "from": {"id": 9, "is_bot": false, "first_name": "x"},
                    "chat": {"id": -42, "type": "group", "title": "g"},
                    "text": "/subscribe@VapeBot"
                }
            }]
        }"#;
        let Ok(resp) = serde_json::from_str::<ApiResponse<Vec<Update>>>(raw) else {
            panic!("decode failed");
        };
        let Some(updates) = resp.result else {
            panic!("missing result");
        };
        let Some(msg) = updates.first().and_then(Update::any_message) else {
            panic!("missing message");
        };
        assert_eq!(msg.chat.id, -42);
        assert_eq!(msg.text.as_deref(), Some("/subscribe@VapeBot"));
    }

    #[test]
    fn decodes_error_envelope() {
        let raw = r#"{"ok":false,"error_code":429,"description":"Too Many Requests","parameters":{"retry_after":7}}"#;
        let Ok(resp) = serde_json::from_str::<ApiResponse<bool>>(raw) else {
            panic!("decode failed");
        };
        assert!(!resp.ok);
        assert_eq!(resp.error_code, Some(429));
        assert_eq!(resp.parameters.and_then(|p| p.retry_after), Some(7));
    }
}
