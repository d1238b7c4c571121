//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{EventId, UserId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    #[error("Signup not found: event {event_id}, user {user_id}")]
    SignupNotFound { event_id: EventId, user_id: UserId },

    #[error("No relayed copy of message {origin_id} in chat {destination_chat_id}")]
    MirrorLinkNotFound {
        origin_id: i64,
        destination_chat_id: i64,
    },

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Registration is closed for event {0}")]
    RegistrationClosed(EventId),

    #[error("Event {0} has been cancelled")]
    EventCancelled(EventId),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string, used by the front end for locale lookup
    pub fn code(&self) -> &'static str {
        match self {
            Self::EventNotFound(_) => "UNKNOWN_EVENT",
            Self::SignupNotFound { .. } => "UNKNOWN_SIGNUP",
            Self::MirrorLinkNotFound { .. } => "UNKNOWN_MIRROR_LINK",
            Self::RegistrationClosed(_) => "REGISTRATION_CLOSED",
            Self::EventCancelled(_) => "EVENT_CANCELLED",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EventNotFound(_) | Self::SignupNotFound { .. } | Self::MirrorLinkNotFound { .. }
        )
    }

    /// Check if this is a business rule violation
    pub fn is_rule_violation(&self) -> bool {
        matches!(self, Self::RegistrationClosed(_) | Self::EventCancelled(_))
    }
}
