//! EventSignup database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the event_signups table, keyed by (event_id, user_id)
#[derive(Debug, Clone, FromRow)]
pub struct SignupModel {
    pub event_id: i64,
    pub user_id: i64,
    /// Status: 'pending_approval', 'pending_payment', 'approved', 'rejected'
    pub status: String,
    pub decided_by: Option<i64>,
    pub decided_at: Option<DateTime<Utc>>,
    pub options: Vec<String>,
    pub participation_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl SignupModel {
    /// Check if an admin has ruled on this signup
    #[inline]
    pub fn decided(&self) -> bool {
        self.decided_by.is_some()
    }

    /// Check if the signup is approved
    #[inline]
    pub fn is_approved(&self) -> bool {
        self.status == "approved"
    }
}
