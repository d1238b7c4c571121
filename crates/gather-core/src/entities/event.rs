//! Event entity - a community gathering users can sign up for

use chrono::{DateTime, Utc};

use crate::entities::signup::SignupStatus;
use crate::value_objects::EventId;

/// Payment expectation attached to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentPolicy {
    /// Attendance costs a fixed price
    Required,
    /// Voluntary donation; a suggested price may be set
    Donation,
    /// Free event
    #[default]
    NotRequired,
}

impl PaymentPolicy {
    /// Storage string for the database column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Donation => "donation",
            Self::NotRequired => "not_required",
        }
    }

    /// Parse a storage string; unknown values fall back to `NotRequired`
    pub fn parse(s: &str) -> Self {
        match s {
            "required" => Self::Required,
            "donation" => Self::Donation,
            _ => Self::NotRequired,
        }
    }
}

/// Event entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Announcement text shown in the group and in reminders
    pub announcement: String,
    pub registration_open: bool,
    pub cancelled: bool,
    /// Set when an admin moved the date after signups existed
    pub date_changed: bool,
    /// Signups need an explicit admin decision before payment/approval
    pub require_approval: bool,
    /// Flips false -> true exactly once, when the reminder claim wins
    pub reminder_sent: bool,
    pub payment: PaymentPolicy,
    pub price: Option<String>,
    pub iban: Option<String>,
    pub recipient: Option<String>,
    /// Labels the user can pick from when signing up (e.g. roles, menus)
    pub options: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a new Event with default flags
    pub fn new(id: EventId, date: DateTime<Utc>, announcement: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            date,
            announcement,
            registration_open: true,
            cancelled: false,
            date_changed: false,
            require_approval: false,
            reminder_sent: false,
            payment: PaymentPolicy::NotRequired,
            price: None,
            iban: None,
            recipient: None,
            options: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the payment policy and optional price
    pub fn with_payment(mut self, payment: PaymentPolicy, price: Option<String>) -> Self {
        self.payment = payment;
        self.price = price;
        self
    }

    /// Require an admin decision before a signup proceeds
    pub fn with_approval(mut self, require_approval: bool) -> Self {
        self.require_approval = require_approval;
        self
    }

    /// Set the participation option labels
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    /// Set bank transfer details for paid events
    pub fn with_transfer_details(mut self, iban: String, recipient: String) -> Self {
        self.iban = Some(iban);
        self.recipient = Some(recipient);
        self
    }

    /// Whether attendees are expected to pay.
    ///
    /// True for `Required`, and for `Donation` when a suggested price is set.
    pub fn payment_due(&self) -> bool {
        match self.payment {
            PaymentPolicy::Required => true,
            PaymentPolicy::Donation => self.price.is_some(),
            PaymentPolicy::NotRequired => false,
        }
    }

    /// Whether new signups are currently accepted
    #[inline]
    pub fn accepts_signups(&self) -> bool {
        self.registration_open && !self.cancelled
    }

    /// Initial status for a fresh signup on this event.
    ///
    /// Approval gates payment: an event that requires approval always parks
    /// the signup at `PendingApproval` first, even when payment is due.
    pub fn signup_destination(&self) -> SignupStatus {
        if self.require_approval {
            SignupStatus::PendingApproval
        } else if self.payment_due() {
            SignupStatus::PendingPayment
        } else {
            SignupStatus::Approved
        }
    }

    /// Whether the event date lies in the past
    #[inline]
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.date <= now
    }
}
