//! # gather-service
//!
//! Application layer containing the signup state machine, the message
//! mirror, and the reminder scheduler.

pub mod services;

pub use services::{
    ConfirmOutcome, DecisionNotice, MirrorService, OriginEdit, OriginMessage, PropagationReport,
    RejectOutcome, ReminderCopy, ReminderScheduler, ReplyPolicy, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, SignupOutcome, SignupService,
    WithdrawOutcome,
};
