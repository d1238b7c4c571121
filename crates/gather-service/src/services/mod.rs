//! Business logic services
//!
//! This module contains the service layer implementations that handle the
//! event lifecycle: relaying messages between chats, driving signup state
//! transitions, and running the background reminder loop.

pub mod context;
pub mod error;
pub mod mirror;
pub mod reminder;
pub mod signup;

// Re-export all services for convenience
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use mirror::{MirrorService, OriginEdit, OriginMessage, PropagationReport, ReplyPolicy};
pub use reminder::{ReminderCopy, ReminderScheduler};
pub use signup::{
    ConfirmOutcome, DecisionNotice, RejectOutcome, SignupOutcome, SignupService, WithdrawOutcome,
};
