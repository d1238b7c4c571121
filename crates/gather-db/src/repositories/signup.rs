//! PostgreSQL implementation of SignupRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use gather_core::entities::{EventSignup, SignupStatus};
use gather_core::traits::{RepoResult, SignupRepository, StatusTransition};
use gather_core::value_objects::{EventId, UserId};

use crate::mappers::parse_signup_status;
use crate::models::SignupModel;

use super::error::map_db_error;

const SIGNUP_COLUMNS: &str = "event_id, user_id, status, decided_by, decided_at, options, \
     participation_confirmed, created_at";

/// PostgreSQL implementation of SignupRepository
#[derive(Clone)]
pub struct PgSignupRepository {
    pool: PgPool,
}

impl PgSignupRepository {
    /// Create a new PgSignupRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SignupRepository for PgSignupRepository {
    #[instrument(skip(self))]
    async fn find(&self, event_id: EventId, user_id: UserId) -> RepoResult<Option<EventSignup>> {
        let result = sqlx::query_as::<_, SignupModel>(&format!(
            "SELECT {SIGNUP_COLUMNS} FROM event_signups
             WHERE event_id = $1 AND user_id = $2"
        ))
        .bind(event_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(EventSignup::from))
    }

    #[instrument(skip(self))]
    async fn find_by_event(&self, event_id: EventId) -> RepoResult<Vec<EventSignup>> {
        let results = sqlx::query_as::<_, SignupModel>(&format!(
            "SELECT {SIGNUP_COLUMNS} FROM event_signups
             WHERE event_id = $1
             ORDER BY created_at ASC"
        ))
        .bind(event_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(EventSignup::from).collect())
    }

    #[instrument(skip(self))]
    async fn approved_for_event(&self, event_id: EventId) -> RepoResult<Vec<EventSignup>> {
        let results = sqlx::query_as::<_, SignupModel>(&format!(
            "SELECT {SIGNUP_COLUMNS} FROM event_signups
             WHERE event_id = $1 AND status = $2
             ORDER BY created_at ASC"
        ))
        .bind(event_id.into_inner())
        .bind(SignupStatus::Approved.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(EventSignup::from).collect())
    }

    #[instrument(skip(self, signup))]
    async fn create(&self, signup: &EventSignup) -> RepoResult<bool> {
        // ON CONFLICT DO NOTHING makes double submissions a no-op; the
        // caller learns from the row count whether this insert won.
        let result = sqlx::query(
            "INSERT INTO event_signups
                 (event_id, user_id, status, options, participation_confirmed, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (event_id, user_id) DO NOTHING",
        )
        .bind(signup.event_id.into_inner())
        .bind(signup.user_id.into_inner())
        .bind(signup.status.as_str())
        .bind(&signup.options)
        .bind(signup.participation_confirmed)
        .bind(signup.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, allowed_from))]
    async fn transition(
        &self,
        event_id: EventId,
        user_id: UserId,
        allowed_from: &[SignupStatus],
        to: SignupStatus,
        decided_by: UserId,
        decided_at: DateTime<Utc>,
    ) -> RepoResult<Option<StatusTransition>> {
        // Row lock for the read-check-write; concurrent decisions on the
        // same signup serialize here and the loser sees the new status.
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let current = sqlx::query_as::<_, SignupModel>(&format!(
            "SELECT {SIGNUP_COLUMNS} FROM event_signups
             WHERE event_id = $1 AND user_id = $2
             FOR UPDATE"
        ))
        .bind(event_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some(row) = current else {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(None);
        };

        let prior = parse_signup_status(&row.status);
        if !allowed_from.contains(&prior) {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(Some(StatusTransition::Unchanged { current: prior }));
        }

        let updated = sqlx::query_as::<_, SignupModel>(&format!(
            "UPDATE event_signups
             SET status = $3, decided_by = $4, decided_at = $5
             WHERE event_id = $1 AND user_id = $2
             RETURNING {SIGNUP_COLUMNS}"
        ))
        .bind(event_id.into_inner())
        .bind(user_id.into_inner())
        .bind(to.as_str())
        .bind(decided_by.into_inner())
        .bind(decided_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(Some(StatusTransition::Applied {
            signup: EventSignup::from(updated),
            prior,
        }))
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> RepoResult<Option<EventSignup>> {
        let result = sqlx::query_as::<_, SignupModel>(&format!(
            "DELETE FROM event_signups
             WHERE event_id = $1 AND user_id = $2
             RETURNING {SIGNUP_COLUMNS}"
        ))
        .bind(event_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(EventSignup::from))
    }

    #[instrument(skip(self))]
    async fn set_participation_confirmed(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE event_signups
             SET participation_confirmed = TRUE
             WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
