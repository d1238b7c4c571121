//! Typed identifiers for the messaging domain
//!
//! The transport hands us raw 64-bit integers for chats, messages, users,
//! and events. Wrapping them keeps the four id spaces from being mixed up
//! at compile time; they serialize as plain numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a chat (group, channel, or private conversation)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChatId(i64);

/// Identifier of a message, unique within its chat
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(i64);

/// Identifier of a user account on the transport
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of an event row in the store
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventId(i64);

macro_rules! id_common {
    ($name:ident) => {
        impl $name {
            /// Create from a raw i64 value
            #[inline]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the inner i64 value
            #[inline]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_common!(ChatId);
id_common!(MessageId);
id_common!(UserId);
id_common!(EventId);

impl UserId {
    /// The private chat with this user.
    ///
    /// On the transport, a user's direct-message chat carries the same
    /// numeric id as the user account itself.
    #[inline]
    pub const fn into_private_chat(self) -> ChatId {
        ChatId::new(self.0)
    }
}
