//! EventSignup entity <-> model mapper

use gather_core::entities::{EventSignup, SignupStatus};
use gather_core::value_objects::{EventId, UserId};

use crate::models::SignupModel;

/// Parse a stored status string.
///
/// A row can only hold strings this crate wrote, so an unknown value means
/// external tampering; fall back to the most conservative state.
pub fn parse_signup_status(s: &str) -> SignupStatus {
    SignupStatus::parse(s).unwrap_or(SignupStatus::PendingApproval)
}

/// Convert SignupModel to EventSignup entity
impl From<SignupModel> for EventSignup {
    fn from(model: SignupModel) -> Self {
        EventSignup {
            event_id: EventId::new(model.event_id),
            user_id: UserId::new(model.user_id),
            status: parse_signup_status(&model.status),
            decided_by: model.decided_by.map(UserId::new),
            decided_at: model.decided_at,
            options: model.options,
            participation_confirmed: model.participation_confirmed,
            created_at: model.created_at,
        }
    }
}
