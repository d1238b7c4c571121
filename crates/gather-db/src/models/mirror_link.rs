//! MirrorLink database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the mirror_links table (append-only)
#[derive(Debug, Clone, FromRow)]
pub struct MirrorLinkModel {
    pub id: i64,
    pub origin_id: i64,
    pub origin_chat_id: i64,
    pub destination_id: i64,
    pub destination_chat_id: i64,
    pub created_at: DateTime<Utc>,
}
