//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. All mutations of shared state (an event's
//! `reminder_sent` flag, a signup's `status`) are expressed as atomic
//! compare-and-set operations here; callers never hold a mutable row handle
//! across an await point.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Event, EventSignup, MirrorLink, PaymentPolicy, SignupStatus};
use crate::error::DomainError;
use crate::value_objects::{ChatId, EventId, MessageId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Event Repository
// ============================================================================

/// Partial update for an event, applied atomically.
///
/// `reminder_sent` is deliberately absent: that flag only flips through
/// `claim_due_for_reminder`.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub date: Option<DateTime<Utc>>,
    pub announcement: Option<String>,
    pub registration_open: Option<bool>,
    pub cancelled: Option<bool>,
    pub require_approval: Option<bool>,
    pub payment: Option<PaymentPolicy>,
    pub price: Option<String>,
    pub iban: Option<String>,
    pub recipient: Option<String>,
    pub options: Option<Vec<String>>,
}

impl EventPatch {
    /// Whether the patch changes anything at all
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.announcement.is_none()
            && self.registration_open.is_none()
            && self.cancelled.is_none()
            && self.require_approval.is_none()
            && self.payment.is_none()
            && self.price.is_none()
            && self.iban.is_none()
            && self.recipient.is_none()
            && self.options.is_none()
    }
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Find event by ID
    async fn find_by_id(&self, id: EventId) -> RepoResult<Option<Event>>;

    /// List events whose date lies at or after `now`, earliest first
    async fn list_upcoming(&self, now: DateTime<Utc>) -> RepoResult<Vec<Event>>;

    /// Create a new event; returns the stored snapshot with its assigned id
    async fn create(&self, event: &Event) -> RepoResult<Event>;

    /// Apply a partial update and return the fresh snapshot.
    ///
    /// Setting `date` also raises the `date_changed` flag.
    async fn update(&self, id: EventId, patch: EventPatch) -> RepoResult<Event>;

    /// Atomically claim the next event due for a reminder.
    ///
    /// Selects the earliest event with `reminder_sent = false`, not
    /// cancelled, whose date is still upcoming (`> now`) but within the
    /// reminder window (`<= due_before`), and flips `reminder_sent` to true
    /// in the same statement. At most one caller can win the claim for a
    /// given event; everyone else sees `None`.
    async fn claim_due_for_reminder(
        &self,
        due_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Event>>;
}

// ============================================================================
// Signup Repository
// ============================================================================

/// Result of a conditional status transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTransition {
    /// The row matched one of the allowed source states and was updated
    Applied {
        /// The signup after the transition
        signup: EventSignup,
        /// Status the row held immediately before the transition
        prior: SignupStatus,
    },
    /// The row exists but its status was outside the allowed source states
    Unchanged { current: SignupStatus },
}

#[async_trait]
pub trait SignupRepository: Send + Sync {
    /// Find signup by (event, user)
    async fn find(&self, event_id: EventId, user_id: UserId) -> RepoResult<Option<EventSignup>>;

    /// List all signups for an event
    async fn find_by_event(&self, event_id: EventId) -> RepoResult<Vec<EventSignup>>;

    /// List approved signups for an event (reminder fan-out set)
    async fn approved_for_event(&self, event_id: EventId) -> RepoResult<Vec<EventSignup>>;

    /// Insert a new signup row.
    ///
    /// Returns false when a row for (event, user) already exists; the
    /// existing row is left untouched.
    async fn create(&self, signup: &EventSignup) -> RepoResult<bool>;

    /// Conditionally move a signup to `to` if its current status is one of
    /// `allowed_from`, recording the deciding admin and time.
    ///
    /// Returns `None` when no row exists for (event, user). The check and
    /// the write happen atomically; two concurrent admin decisions cannot
    /// both apply.
    async fn transition(
        &self,
        event_id: EventId,
        user_id: UserId,
        allowed_from: &[SignupStatus],
        to: SignupStatus,
        decided_by: UserId,
        decided_at: DateTime<Utc>,
    ) -> RepoResult<Option<StatusTransition>>;

    /// Delete the signup row, returning it if it existed
    async fn delete(&self, event_id: EventId, user_id: UserId)
        -> RepoResult<Option<EventSignup>>;

    /// Mark the user's participation as confirmed (reminder reply flow).
    ///
    /// Returns false when no row exists. Idempotent; the flag only moves
    /// false -> true.
    async fn set_participation_confirmed(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> RepoResult<bool>;
}

// ============================================================================
// Mirror Repository
// ============================================================================

#[async_trait]
pub trait MirrorRepository: Send + Sync {
    /// Persist a new link; returns the stored row with its assigned id.
    ///
    /// Links are append-only and never deleted.
    async fn create(&self, link: &MirrorLink) -> RepoResult<MirrorLink>;

    /// All destinations the origin message was relayed to
    async fn find_by_origin(
        &self,
        origin_id: MessageId,
        origin_chat_id: ChatId,
    ) -> RepoResult<Vec<MirrorLink>>;

    /// The copy of the origin message inside a specific destination chat,
    /// used for reply-to resolution
    async fn find_destination(
        &self,
        origin_id: MessageId,
        origin_chat_id: ChatId,
        destination_chat_id: ChatId,
    ) -> RepoResult<Option<MirrorLink>>;
}
