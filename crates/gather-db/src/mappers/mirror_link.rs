//! MirrorLink entity <-> model mapper

use gather_core::entities::MirrorLink;
use gather_core::value_objects::{ChatId, MessageId};

use crate::models::MirrorLinkModel;

/// Convert MirrorLinkModel to MirrorLink entity
impl From<MirrorLinkModel> for MirrorLink {
    fn from(model: MirrorLinkModel) -> Self {
        MirrorLink {
            id: model.id,
            origin_id: MessageId::new(model.origin_id),
            origin_chat_id: ChatId::new(model.origin_chat_id),
            destination_id: MessageId::new(model.destination_id),
            destination_chat_id: ChatId::new(model.destination_chat_id),
            created_at: model.created_at,
        }
    }
}
