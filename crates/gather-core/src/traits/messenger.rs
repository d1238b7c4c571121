//! Messenger port - the outbound notification transport
//!
//! The engine treats every send as a fallible remote call. No delivery
//! ordering is assumed beyond what callers impose themselves.

use async_trait::async_trait;
use thiserror::Error;

use crate::value_objects::{ChatId, MessageId};

/// Errors from the outbound transport
#[derive(Debug, Error)]
pub enum SendError {
    /// The transport refused an edit because nothing changed.
    ///
    /// Benign for edit propagation; treated as success there.
    #[error("Message content unchanged")]
    ContentUnchanged,

    /// The destination refuses messages from us (e.g. the user blocked
    /// the bot or the bot was removed from the chat)
    #[error("Destination forbidden: {0}")]
    Forbidden(String),

    /// The transport asked us to slow down
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Anything else: connectivity, serialization, transport-side 5xx
    #[error("Transport error: {0}")]
    Network(String),
}

impl SendError {
    /// Whether this failure can be treated as success for edit propagation
    #[inline]
    pub fn is_benign_for_edit(&self) -> bool {
        matches!(self, Self::ContentUnchanged)
    }
}

/// Result type for transport operations
pub type SendResult<T> = Result<T, SendError>;

/// Options applied to an outbound send
#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    /// Thread the message as a reply to an existing message in the
    /// destination chat
    pub reply_to: Option<MessageId>,
    /// Deliver without a notification sound
    pub silent: bool,
}

impl SendOptions {
    /// Reply to the given message
    pub fn reply_to(message: MessageId) -> Self {
        Self {
            reply_to: Some(message),
            ..Self::default()
        }
    }
}

/// Replacement content for an in-place edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditPayload {
    /// Replace the text of a text message
    Text(String),
    /// Replace the caption of a media message
    Caption(String),
}

impl EditPayload {
    /// The textual content regardless of payload kind
    pub fn text(&self) -> &str {
        match self {
            Self::Text(t) | Self::Caption(t) => t,
        }
    }

    /// Build the same payload kind around new text
    pub fn with_text(&self, text: String) -> Self {
        match self {
            Self::Text(_) => Self::Text(text),
            Self::Caption(_) => Self::Caption(text),
        }
    }
}

/// Outbound messaging transport
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a plain text message; returns the id of the sent message
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        options: SendOptions,
    ) -> SendResult<MessageId>;

    /// Copy an existing message into another chat; returns the id of the copy
    async fn copy_message(
        &self,
        from_chat: ChatId,
        message: MessageId,
        to_chat: ChatId,
        options: SendOptions,
    ) -> SendResult<MessageId>;

    /// Replace the content of a previously sent message in place
    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        content: EditPayload,
    ) -> SendResult<()>;

    /// Set an emoji reaction on a message
    async fn set_reaction(&self, chat: ChatId, message: MessageId, emoji: &str) -> SendResult<()>;
}
