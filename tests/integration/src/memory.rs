//! In-memory implementations of the repository ports
//!
//! Mutex-guarded maps with the same atomicity guarantees the real store
//! provides: the reminder claim and the signup transitions each run their
//! check-and-write under one lock acquisition.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use gather_core::entities::{Event, EventSignup, MirrorLink, SignupStatus};
use gather_core::traits::{
    EventPatch, EventRepository, MirrorRepository, RepoResult, SignupRepository, StatusTransition,
};
use gather_core::value_objects::{ChatId, EventId, MessageId, UserId};
use gather_core::DomainError;

// ============================================================================
// Events
// ============================================================================

/// In-memory EventRepository
#[derive(Default)]
pub struct MemoryEventRepository {
    events: Mutex<HashMap<i64, Event>>,
    next_id: AtomicI64,
}

impl MemoryEventRepository {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Direct snapshot of a stored event, bypassing the port
    pub fn snapshot(&self, id: EventId) -> Option<Event> {
        self.events.lock().get(&id.into_inner()).cloned()
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn find_by_id(&self, id: EventId) -> RepoResult<Option<Event>> {
        Ok(self.events.lock().get(&id.into_inner()).cloned())
    }

    async fn list_upcoming(&self, now: DateTime<Utc>) -> RepoResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .events
            .lock()
            .values()
            .filter(|e| e.date >= now && !e.cancelled)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    async fn create(&self, event: &Event) -> RepoResult<Event> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut stored = event.clone();
        stored.id = EventId::new(id);
        self.events.lock().insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: EventId, patch: EventPatch) -> RepoResult<Event> {
        let mut events = self.events.lock();
        let event = events
            .get_mut(&id.into_inner())
            .ok_or(DomainError::EventNotFound(id))?;

        if let Some(date) = patch.date {
            event.date = date;
            event.date_changed = true;
        }
        if let Some(announcement) = patch.announcement {
            event.announcement = announcement;
        }
        if let Some(open) = patch.registration_open {
            event.registration_open = open;
        }
        if let Some(cancelled) = patch.cancelled {
            event.cancelled = cancelled;
        }
        if let Some(approval) = patch.require_approval {
            event.require_approval = approval;
        }
        if let Some(payment) = patch.payment {
            event.payment = payment;
        }
        if let Some(price) = patch.price {
            event.price = Some(price);
        }
        if let Some(iban) = patch.iban {
            event.iban = Some(iban);
        }
        if let Some(recipient) = patch.recipient {
            event.recipient = Some(recipient);
        }
        if let Some(options) = patch.options {
            event.options = options;
        }
        event.updated_at = Utc::now();

        Ok(event.clone())
    }

    async fn claim_due_for_reminder(
        &self,
        due_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Event>> {
        // Single lock acquisition makes the select-and-flip atomic, like
        // the conditional UPDATE in the real store.
        let mut events = self.events.lock();
        let winner = events
            .values()
            .filter(|e| !e.reminder_sent && !e.cancelled && e.date > now && e.date <= due_before)
            .min_by_key(|e| (e.date, e.id))
            .map(|e| e.id.into_inner());

        Ok(winner.map(|id| {
            let event = events.get_mut(&id).expect("winner exists under lock");
            event.reminder_sent = true;
            event.updated_at = Utc::now();
            event.clone()
        }))
    }
}

// ============================================================================
// Signups
// ============================================================================

/// In-memory SignupRepository
#[derive(Default)]
pub struct MemorySignupRepository {
    signups: Mutex<HashMap<(i64, i64), EventSignup>>,
}

impl MemorySignupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignupRepository for MemorySignupRepository {
    async fn find(&self, event_id: EventId, user_id: UserId) -> RepoResult<Option<EventSignup>> {
        Ok(self
            .signups
            .lock()
            .get(&(event_id.into_inner(), user_id.into_inner()))
            .cloned())
    }

    async fn find_by_event(&self, event_id: EventId) -> RepoResult<Vec<EventSignup>> {
        let mut signups: Vec<EventSignup> = self
            .signups
            .lock()
            .values()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect();
        signups.sort_by_key(|s| s.user_id);
        Ok(signups)
    }

    async fn approved_for_event(&self, event_id: EventId) -> RepoResult<Vec<EventSignup>> {
        let mut signups: Vec<EventSignup> = self
            .signups
            .lock()
            .values()
            .filter(|s| s.event_id == event_id && s.status == SignupStatus::Approved)
            .cloned()
            .collect();
        signups.sort_by_key(|s| s.user_id);
        Ok(signups)
    }

    async fn create(&self, signup: &EventSignup) -> RepoResult<bool> {
        let mut signups = self.signups.lock();
        let key = (signup.event_id.into_inner(), signup.user_id.into_inner());
        if signups.contains_key(&key) {
            return Ok(false);
        }
        signups.insert(key, signup.clone());
        Ok(true)
    }

    async fn transition(
        &self,
        event_id: EventId,
        user_id: UserId,
        allowed_from: &[SignupStatus],
        to: SignupStatus,
        decided_by: UserId,
        decided_at: DateTime<Utc>,
    ) -> RepoResult<Option<StatusTransition>> {
        let mut signups = self.signups.lock();
        let Some(signup) = signups.get_mut(&(event_id.into_inner(), user_id.into_inner())) else {
            return Ok(None);
        };

        let prior = signup.status;
        if !allowed_from.contains(&prior) {
            return Ok(Some(StatusTransition::Unchanged { current: prior }));
        }

        signup.status = to;
        signup.decided_by = Some(decided_by);
        signup.decided_at = Some(decided_at);

        Ok(Some(StatusTransition::Applied {
            signup: signup.clone(),
            prior,
        }))
    }

    async fn delete(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> RepoResult<Option<EventSignup>> {
        Ok(self
            .signups
            .lock()
            .remove(&(event_id.into_inner(), user_id.into_inner())))
    }

    async fn set_participation_confirmed(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> RepoResult<bool> {
        let mut signups = self.signups.lock();
        match signups.get_mut(&(event_id.into_inner(), user_id.into_inner())) {
            Some(signup) => {
                signup.participation_confirmed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ============================================================================
// Mirror links
// ============================================================================

/// In-memory MirrorRepository (append-only)
#[derive(Default)]
pub struct MemoryMirrorRepository {
    links: Mutex<Vec<MirrorLink>>,
    next_id: AtomicI64,
}

impl MemoryMirrorRepository {
    pub fn new() -> Self {
        Self {
            links: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// All links ever recorded
    pub fn all(&self) -> Vec<MirrorLink> {
        self.links.lock().clone()
    }
}

#[async_trait]
impl MirrorRepository for MemoryMirrorRepository {
    async fn create(&self, link: &MirrorLink) -> RepoResult<MirrorLink> {
        let mut stored = link.clone();
        stored.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.links.lock().push(stored.clone());
        Ok(stored)
    }

    async fn find_by_origin(
        &self,
        origin_id: MessageId,
        origin_chat_id: ChatId,
    ) -> RepoResult<Vec<MirrorLink>> {
        Ok(self
            .links
            .lock()
            .iter()
            .filter(|l| l.origin_id == origin_id && l.origin_chat_id == origin_chat_id)
            .cloned()
            .collect())
    }

    async fn find_destination(
        &self,
        origin_id: MessageId,
        origin_chat_id: ChatId,
        destination_chat_id: ChatId,
    ) -> RepoResult<Option<MirrorLink>> {
        Ok(self
            .links
            .lock()
            .iter()
            .filter(|l| {
                l.origin_id == origin_id
                    && l.origin_chat_id == origin_chat_id
                    && l.destination_chat_id == destination_chat_id
            })
            .max_by_key(|l| l.id)
            .cloned())
    }
}
