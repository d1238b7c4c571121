//! Event entity <-> model mapper

use gather_core::entities::{Event, PaymentPolicy};
use gather_core::value_objects::EventId;

use crate::models::EventModel;

/// Convert EventModel to Event entity
impl From<EventModel> for Event {
    fn from(model: EventModel) -> Self {
        Event {
            id: EventId::new(model.id),
            date: model.date,
            announcement: model.announcement,
            registration_open: model.registration_open,
            cancelled: model.cancelled,
            date_changed: model.date_changed,
            require_approval: model.require_approval,
            reminder_sent: model.reminder_sent,
            payment: PaymentPolicy::parse(&model.payment),
            price: model.price,
            iban: model.iban,
            recipient: model.recipient,
            options: model.options,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
