//! PostgreSQL implementation of MirrorRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use gather_core::entities::MirrorLink;
use gather_core::traits::{MirrorRepository, RepoResult};
use gather_core::value_objects::{ChatId, MessageId};

use crate::models::MirrorLinkModel;

use super::error::map_db_error;

const LINK_COLUMNS: &str =
    "id, origin_id, origin_chat_id, destination_id, destination_chat_id, created_at";

/// PostgreSQL implementation of MirrorRepository
#[derive(Clone)]
pub struct PgMirrorRepository {
    pool: PgPool,
}

impl PgMirrorRepository {
    /// Create a new PgMirrorRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MirrorRepository for PgMirrorRepository {
    #[instrument(skip(self, link))]
    async fn create(&self, link: &MirrorLink) -> RepoResult<MirrorLink> {
        let result = sqlx::query_as::<_, MirrorLinkModel>(&format!(
            "INSERT INTO mirror_links
                 (origin_id, origin_chat_id, destination_id, destination_chat_id, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {LINK_COLUMNS}"
        ))
        .bind(link.origin_id.into_inner())
        .bind(link.origin_chat_id.into_inner())
        .bind(link.destination_id.into_inner())
        .bind(link.destination_chat_id.into_inner())
        .bind(link.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(MirrorLink::from(result))
    }

    #[instrument(skip(self))]
    async fn find_by_origin(
        &self,
        origin_id: MessageId,
        origin_chat_id: ChatId,
    ) -> RepoResult<Vec<MirrorLink>> {
        let results = sqlx::query_as::<_, MirrorLinkModel>(&format!(
            "SELECT {LINK_COLUMNS} FROM mirror_links
             WHERE origin_id = $1 AND origin_chat_id = $2
             ORDER BY id ASC"
        ))
        .bind(origin_id.into_inner())
        .bind(origin_chat_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(MirrorLink::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_destination(
        &self,
        origin_id: MessageId,
        origin_chat_id: ChatId,
        destination_chat_id: ChatId,
    ) -> RepoResult<Option<MirrorLink>> {
        // History is append-only; the newest link is the live one used for
        // reply-to resolution.
        let result = sqlx::query_as::<_, MirrorLinkModel>(&format!(
            "SELECT {LINK_COLUMNS} FROM mirror_links
             WHERE origin_id = $1 AND origin_chat_id = $2 AND destination_chat_id = $3
             ORDER BY id DESC
             LIMIT 1"
        ))
        .bind(origin_id.into_inner())
        .bind(origin_chat_id.into_inner())
        .bind(destination_chat_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(MirrorLink::from))
    }
}
