//! Event database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the events table
#[derive(Debug, Clone, FromRow)]
pub struct EventModel {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub announcement: String,
    pub registration_open: bool,
    pub cancelled: bool,
    pub date_changed: bool,
    pub require_approval: bool,
    pub reminder_sent: bool,
    /// Payment policy: 'required', 'donation', 'not_required'
    pub payment: String,
    pub price: Option<String>,
    pub iban: Option<String>,
    pub recipient: Option<String>,
    pub options: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventModel {
    /// Check if the event still accepts signups
    #[inline]
    pub fn accepts_signups(&self) -> bool {
        self.registration_open && !self.cancelled
    }
}
