//! EventSignup entity - one user's participation record for one event

use chrono::{DateTime, Utc};

use crate::value_objects::{EventId, UserId};

/// Where a signup sits in the approval/payment flow.
///
/// Absence of a row means "not signed up"; withdrawal deletes the row rather
/// than adding a terminal state, so a withdrawn user can sign up again fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupStatus {
    /// Waiting for an admin to approve or reject
    PendingApproval,
    /// Approved in principle, payment still outstanding
    PendingPayment,
    Approved,
    Rejected,
}

impl SignupStatus {
    /// Storage string for the database column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingApproval => "pending_approval",
            Self::PendingPayment => "pending_payment",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a storage string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_approval" => Some(Self::PendingApproval),
            "pending_payment" => Some(Self::PendingPayment),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether the signup still awaits an admin decision or payment
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingApproval | Self::PendingPayment)
    }
}

/// EventSignup entity, keyed by (event, user)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSignup {
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: SignupStatus,
    /// Admin who made the approve/reject decision
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
    /// Participation option labels the user picked when signing up
    pub options: Vec<String>,
    /// Set when the user replies to the reminder confirming attendance
    pub participation_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl EventSignup {
    /// Create a new EventSignup in the given initial status
    pub fn new(
        event_id: EventId,
        user_id: UserId,
        status: SignupStatus,
        options: Vec<String>,
    ) -> Self {
        Self {
            event_id,
            user_id,
            status,
            decided_by: None,
            decided_at: None,
            options,
            participation_confirmed: false,
            created_at: Utc::now(),
        }
    }

    /// Whether an admin has ruled on this signup
    #[inline]
    pub fn decided(&self) -> bool {
        self.decided_by.is_some()
    }

    /// Whether withdrawing or rejecting this signup may leave money
    /// to pay back.
    ///
    /// Heuristic from the immediately preceding status only; actual payment
    /// receipt is not modeled.
    pub fn may_have_paid(&self) -> bool {
        matches!(
            self.status,
            SignupStatus::Approved | SignupStatus::PendingPayment
        )
    }
}
