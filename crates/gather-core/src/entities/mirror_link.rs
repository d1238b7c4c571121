//! MirrorLink entity - correlates an origin message with a relayed copy

use chrono::{DateTime, Utc};

use crate::value_objects::{ChatId, MessageId};

/// Durable record that a message was relayed into another chat.
///
/// One origin may fan out to several destinations (one link per destination
/// chat); for a given (origin, destination chat) at most one live link is
/// used for reply-to resolution. Links are never deleted; they double as the
/// correlation history for later edits and reactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorLink {
    /// Synthetic id, assigned by the store (0 until persisted)
    pub id: i64,
    pub origin_id: MessageId,
    pub origin_chat_id: ChatId,
    pub destination_id: MessageId,
    pub destination_chat_id: ChatId,
    pub created_at: DateTime<Utc>,
}

impl MirrorLink {
    /// Create a new, not-yet-persisted MirrorLink
    pub fn new(
        origin_id: MessageId,
        origin_chat_id: ChatId,
        destination_id: MessageId,
        destination_chat_id: ChatId,
    ) -> Self {
        Self {
            id: 0,
            origin_id,
            origin_chat_id,
            destination_id,
            destination_chat_id,
            created_at: Utc::now(),
        }
    }

    /// Whether this link points into the given chat
    #[inline]
    pub fn targets_chat(&self, chat: ChatId) -> bool {
        self.destination_chat_id == chat
    }
}
