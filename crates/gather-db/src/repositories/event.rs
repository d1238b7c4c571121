//! PostgreSQL implementation of EventRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use gather_core::entities::Event;
use gather_core::traits::{EventPatch, EventRepository, RepoResult};
use gather_core::value_objects::EventId;

use crate::models::EventModel;

use super::error::{event_not_found, map_db_error};

const EVENT_COLUMNS: &str = "id, date, announcement, registration_open, cancelled, date_changed, \
     require_approval, reminder_sent, payment, price, iban, recipient, options, \
     created_at, updated_at";

/// PostgreSQL implementation of EventRepository
#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Create a new PgEventRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: EventId) -> RepoResult<Option<Event>> {
        let result = sqlx::query_as::<_, EventModel>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Event::from))
    }

    #[instrument(skip(self))]
    async fn list_upcoming(&self, now: DateTime<Utc>) -> RepoResult<Vec<Event>> {
        let results = sqlx::query_as::<_, EventModel>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE date >= $1 AND cancelled = FALSE
             ORDER BY date ASC"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Event::from).collect())
    }

    #[instrument(skip(self, event))]
    async fn create(&self, event: &Event) -> RepoResult<Event> {
        let result = sqlx::query_as::<_, EventModel>(&format!(
            "INSERT INTO events
                 (date, announcement, registration_open, cancelled, date_changed,
                  require_approval, reminder_sent, payment, price, iban, recipient, options)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(event.date)
        .bind(&event.announcement)
        .bind(event.registration_open)
        .bind(event.cancelled)
        .bind(event.date_changed)
        .bind(event.require_approval)
        .bind(event.reminder_sent)
        .bind(event.payment.as_str())
        .bind(&event.price)
        .bind(&event.iban)
        .bind(&event.recipient)
        .bind(&event.options)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Event::from(result))
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: EventId, patch: EventPatch) -> RepoResult<Event> {
        if patch.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| event_not_found(id));
        }

        // COALESCE keeps unset fields; a new date also raises date_changed.
        // reminder_sent is not touched here, only by claim_due_for_reminder.
        let result = sqlx::query_as::<_, EventModel>(&format!(
            "UPDATE events SET
                 date              = COALESCE($2, date),
                 date_changed      = date_changed OR $2 IS NOT NULL,
                 announcement      = COALESCE($3, announcement),
                 registration_open = COALESCE($4, registration_open),
                 cancelled         = COALESCE($5, cancelled),
                 require_approval  = COALESCE($6, require_approval),
                 payment           = COALESCE($7, payment),
                 price             = COALESCE($8, price),
                 iban              = COALESCE($9, iban),
                 recipient         = COALESCE($10, recipient),
                 options           = COALESCE($11, options),
                 updated_at        = NOW()
             WHERE id = $1
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id.into_inner())
        .bind(patch.date)
        .bind(patch.announcement)
        .bind(patch.registration_open)
        .bind(patch.cancelled)
        .bind(patch.require_approval)
        .bind(patch.payment.map(|p| p.as_str()))
        .bind(patch.price)
        .bind(patch.iban)
        .bind(patch.recipient)
        .bind(patch.options)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Event::from).ok_or_else(|| event_not_found(id))
    }

    #[instrument(skip(self))]
    async fn claim_due_for_reminder(
        &self,
        due_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<Event>> {
        // The subquery picks the earliest unreminded upcoming event inside
        // the reminder window; the outer conditional update flips the flag
        // in the same statement. FOR UPDATE SKIP LOCKED keeps two concurrent
        // claimants from ever selecting the same row, and the repeated
        // reminder_sent = FALSE check makes the flip a true compare-and-set.
        let result = sqlx::query_as::<_, EventModel>(&format!(
            "UPDATE events SET reminder_sent = TRUE, updated_at = NOW()
             WHERE id = (
                 SELECT id FROM events
                 WHERE reminder_sent = FALSE
                   AND cancelled = FALSE
                   AND date > $2
                   AND date <= $1
                 ORDER BY date ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             AND reminder_sent = FALSE
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(due_before)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Event::from))
    }
}
