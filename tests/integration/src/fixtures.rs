//! Test fixtures and data generators

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};

use gather_common::ReminderConfig;
use gather_core::entities::Event;
use gather_core::value_objects::{EventId, UserId};
use gather_service::{ServiceContext, ServiceContextBuilder};

use crate::memory::{MemoryEventRepository, MemoryMirrorRepository, MemorySignupRepository};
use crate::messenger::RecordingMessenger;

/// Counter for unique test data
static COUNTER: AtomicI64 = AtomicI64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> i64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Chat receiving group announcements in tests
pub const ANNOUNCE_CHAT: i64 = -100_900;

/// A fully wired engine over in-memory fakes
pub struct TestEngine {
    pub ctx: ServiceContext,
    pub events: Arc<MemoryEventRepository>,
    pub signups: Arc<MemorySignupRepository>,
    pub mirror: Arc<MemoryMirrorRepository>,
    pub messenger: Arc<RecordingMessenger>,
}

impl TestEngine {
    pub fn new() -> Self {
        let events = Arc::new(MemoryEventRepository::new());
        let signups = Arc::new(MemorySignupRepository::new());
        let mirror = Arc::new(MemoryMirrorRepository::new());
        let messenger = Arc::new(RecordingMessenger::new());

        let ctx = ServiceContextBuilder::new()
            .event_repo(events.clone())
            .signup_repo(signups.clone())
            .mirror_repo(mirror.clone())
            .messenger(messenger.clone())
            .build()
            .expect("all dependencies provided");

        Self {
            ctx,
            events,
            signups,
            mirror,
            messenger,
        }
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// An event `hours_ahead` in the future with a unique announcement
pub fn upcoming_event(hours_ahead: i64) -> Event {
    let suffix = unique_suffix();
    Event::new(
        EventId::new(0),
        Utc::now() + Duration::hours(hours_ahead),
        format!("Event #{suffix}"),
    )
}

/// A unique test user
pub fn test_user() -> UserId {
    UserId::new(7_000 + unique_suffix())
}

/// Scheduler configuration with no jitter and a short cycle, suitable for
/// tests running under paused time
pub fn test_reminder_config() -> ReminderConfig {
    ReminderConfig {
        announce_chat_id: ANNOUNCE_CHAT,
        base_interval_secs: 1,
        error_backoff_secs: 5,
        lead_hours: 24,
        send_jitter_max_ms: 0,
    }
}
