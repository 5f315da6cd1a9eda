//! Outgoing message model, templates and unit formatting.
//!
//! [`OutgoingMessage`] is transport-agnostic: the Telegram client maps it
//! onto `sendMessage` parameters, tests inspect it directly.

pub mod templates;
pub mod units;

pub use units::format_ether;

/// How the message text should be interpreted by the chat client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// Literal text.
    Plain,
    /// Telegram's HTML subset (`<b>`, `<a href>`, ...).
    Html,
}

/// An inline button that opens a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlButton {
    /// Button label.
    pub text: String,
    /// Target URL.
    pub url: String,
}

impl UrlButton {
    /// Creates a button.
    #[must_use]
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// A message ready to be delivered to one or more chats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Message body.
    pub text: String,
    /// Interpretation of `text`.
    pub format: TextFormat,
    /// Suppress the link preview card.
    pub disable_link_preview: bool,
    /// Inline keyboard, one `Vec` per row.
    pub buttons: Vec<Vec<UrlButton>>,
}

impl OutgoingMessage {
    /// Plain-text message without buttons.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            disable_link_preview: false,
            buttons: Vec::new(),
        }
    }

    /// HTML message with link previews disabled.
    #[must_use]
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Html,
            disable_link_preview: true,
            buttons: Vec::new(),
        }
    }

    /// Appends a row of buttons.
    #[must_use]
    pub fn with_row(mut self, row: Vec<UrlButton>) -> Self {
        if !row.is_empty() {
            self.buttons.push(row);
        }
        self
    }
}
