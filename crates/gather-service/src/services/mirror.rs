//! Message mirror service
//!
//! Relays messages between a user's private chat and the admin discussion
//! thread (and any other destination), keeps the durable origin→copy links,
//! and propagates later edits and reactions across all copies.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use gather_core::entities::MirrorLink;
use gather_core::traits::{EditPayload, SendOptions};
use gather_core::value_objects::{ChatId, MessageId};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// The message being relayed, as seen in its origin chat
#[derive(Debug, Clone)]
pub struct OriginMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    /// Message this one replies to in the origin chat, if any
    pub reply_to: Option<MessageId>,
}

impl OriginMessage {
    /// A message that is not a reply
    pub fn new(id: MessageId, chat_id: ChatId) -> Self {
        Self {
            id,
            chat_id,
            reply_to: None,
        }
    }

    /// A reply to another message in the same chat
    pub fn reply(id: MessageId, chat_id: ChatId, reply_to: MessageId) -> Self {
        Self {
            id,
            chat_id,
            reply_to: Some(reply_to),
        }
    }
}

/// An edit applied to a previously relayed message
#[derive(Debug, Clone)]
pub struct OriginEdit {
    pub id: MessageId,
    pub chat_id: ChatId,
    /// Replacement text or caption
    pub content: EditPayload,
    pub edited_at: DateTime<Utc>,
}

/// How relay treats the origin's reply threading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyPolicy {
    /// Thread the copy under the destination's copy of the replied-to
    /// message, when one exists
    #[default]
    Threaded,
    /// Always send the copy unthreaded
    Unthreaded,
}

/// Outcome of a fan-out over all linked destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropagationReport {
    /// Destinations we attempted to update
    pub attempted: usize,
    /// Destinations where the update failed (and was skipped)
    pub failed: usize,
}

impl PropagationReport {
    /// Destinations updated successfully
    pub fn applied(&self) -> usize {
        self.attempted - self.failed
    }
}

/// Message mirror service
pub struct MirrorService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MirrorService<'a> {
    /// Create a new MirrorService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Copy a message into `destination_chat` and record the link.
    ///
    /// Under `ReplyPolicy::Threaded`, if the origin is a reply to a message
    /// that already has a copy in the destination chat, the relayed message
    /// is threaded as a reply to that copy; otherwise (or under
    /// `ReplyPolicy::Unthreaded`) it is sent unthreaded. Returns the id of
    /// the copy.
    #[instrument(skip(self, origin), fields(origin_id = %origin.id, origin_chat = %origin.chat_id))]
    pub async fn relay(
        &self,
        origin: &OriginMessage,
        destination_chat: ChatId,
        reply_policy: ReplyPolicy,
    ) -> ServiceResult<MessageId> {
        let mut options = SendOptions::default();

        if let (ReplyPolicy::Threaded, Some(parent)) = (reply_policy, origin.reply_to) {
            let parent_link = self
                .ctx
                .mirror_repo()
                .find_destination(parent, origin.chat_id, destination_chat)
                .await?;

            match parent_link {
                Some(link) => options.reply_to = Some(link.destination_id),
                None => {
                    // Parent was never relayed here; send unthreaded
                    info!(parent = %parent, "Reply parent has no copy in destination, relaying unthreaded");
                }
            }
        }

        let destination_id = self
            .ctx
            .messenger()
            .copy_message(origin.chat_id, origin.id, destination_chat, options)
            .await?;

        let link = MirrorLink::new(origin.id, origin.chat_id, destination_id, destination_chat);
        self.ctx.mirror_repo().create(&link).await?;

        info!(
            destination_id = %destination_id,
            destination_chat = %destination_chat,
            "Message relayed"
        );

        Ok(destination_id)
    }

    /// Re-apply an edit on every copy of the origin message.
    ///
    /// Each copy gets the new content with an "edited at" note appended.
    /// Per-destination failures are logged and skipped; a destination
    /// refusing the edit because nothing changed counts as success.
    #[instrument(skip(self, edit), fields(origin_id = %edit.id, origin_chat = %edit.chat_id))]
    pub async fn propagate_edit(&self, edit: &OriginEdit) -> ServiceResult<PropagationReport> {
        let links = self
            .ctx
            .mirror_repo()
            .find_by_origin(edit.id, edit.chat_id)
            .await?;

        let content = annotate_edit(&edit.content, edit.edited_at);

        let mut report = PropagationReport::default();
        for link in links {
            report.attempted += 1;
            let result = self
                .ctx
                .messenger()
                .edit_message(link.destination_chat_id, link.destination_id, content.clone())
                .await;

            match result {
                Ok(()) => {}
                Err(e) if e.is_benign_for_edit() => {}
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        destination_chat = %link.destination_chat_id,
                        destination_id = %link.destination_id,
                        error = %e,
                        "Failed to propagate edit to destination"
                    );
                }
            }
        }

        info!(
            attempted = report.attempted,
            failed = report.failed,
            "Edit propagated"
        );

        Ok(report)
    }

    /// Set the same reaction on every copy of the origin message.
    ///
    /// Per-destination failures are logged and skipped.
    #[instrument(skip(self))]
    pub async fn propagate_reaction(
        &self,
        origin_id: MessageId,
        origin_chat_id: ChatId,
        emoji: &str,
    ) -> ServiceResult<PropagationReport> {
        let links = self
            .ctx
            .mirror_repo()
            .find_by_origin(origin_id, origin_chat_id)
            .await?;

        let mut report = PropagationReport::default();
        for link in links {
            report.attempted += 1;
            if let Err(e) = self
                .ctx
                .messenger()
                .set_reaction(link.destination_chat_id, link.destination_id, emoji)
                .await
            {
                report.failed += 1;
                warn!(
                    destination_chat = %link.destination_chat_id,
                    destination_id = %link.destination_id,
                    error = %e,
                    "Failed to propagate reaction to destination"
                );
            }
        }

        Ok(report)
    }
}

/// Append the "edited at" note to the replacement content
fn annotate_edit(content: &EditPayload, edited_at: DateTime<Utc>) -> EditPayload {
    content.with_text(format!(
        "{}\n\nedited {}",
        content.text(),
        edited_at.format("%Y-%m-%d %H:%M UTC")
    ))
}
