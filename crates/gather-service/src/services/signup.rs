//! Signup state machine service
//!
//! Validates and performs signup state transitions. Every mutating branch
//! is guarded by a current-state check and reports whether it actually
//! changed anything, so each operation can safely be re-invoked after a
//! crash or a duplicated callback. User-facing notifications go out only
//! when a transition really performed.

use chrono::Utc;
use tracing::{info, instrument, warn};

use gather_core::entities::{EventSignup, SignupStatus};
use gather_core::traits::StatusTransition;
use gather_core::value_objects::{ChatId, EventId, UserId};
use gather_core::DomainError;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Outcome of a signup attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignupOutcome {
    /// False when a row already existed (idempotent no-op)
    pub performed: bool,
    /// The signup's status after the call
    pub status: SignupStatus,
}

/// Outcome of an admin confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmOutcome {
    /// False when the signup was already approved (or otherwise not
    /// confirmable)
    pub performed: bool,
}

/// Outcome of an admin reject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectOutcome {
    /// False when the signup was already rejected
    pub performed: bool,
    /// True when the signup was approved before: money may have changed
    /// hands, so the caller should word the notification accordingly
    pub require_refund: bool,
}

/// Outcome of a user withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawOutcome {
    /// False when no signup row existed
    pub performed: bool,
    /// True when the removed row was approved or pending payment
    pub require_refund: bool,
}

/// Notification to deliver when (and only when) a decision performs
#[derive(Debug, Clone)]
pub struct DecisionNotice {
    pub chat: ChatId,
    pub text: String,
}

impl DecisionNotice {
    /// Notice for the user's private chat
    pub fn for_user(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            chat: user_id.into_private_chat(),
            text: text.into(),
        }
    }
}

const CONFIRMABLE: [SignupStatus; 2] = [SignupStatus::PendingApproval, SignupStatus::PendingPayment];
const REJECTABLE: [SignupStatus; 3] = [
    SignupStatus::PendingApproval,
    SignupStatus::PendingPayment,
    SignupStatus::Approved,
];

/// Signup state machine service
pub struct SignupService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SignupService<'a> {
    /// Create a new SignupService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Sign a user up for an event.
    ///
    /// The initial status follows the event's admission rule: approval
    /// required → `PendingApproval`; payment due → `PendingPayment`;
    /// otherwise `Approved` directly. A second submission is a no-op with
    /// `performed = false`.
    #[instrument(skip(self, options))]
    pub async fn signup(
        &self,
        event_id: EventId,
        user_id: UserId,
        options: Vec<String>,
    ) -> ServiceResult<SignupOutcome> {
        let event = self
            .ctx
            .event_repo()
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event", event_id.to_string()))?;

        if event.cancelled {
            return Err(DomainError::EventCancelled(event_id).into());
        }
        if !event.registration_open {
            return Err(DomainError::RegistrationClosed(event_id).into());
        }

        if let Some(existing) = self.ctx.signup_repo().find(event_id, user_id).await? {
            return Ok(SignupOutcome {
                performed: false,
                status: existing.status,
            });
        }

        let status = event.signup_destination();
        let signup = EventSignup::new(event_id, user_id, status, options);

        if !self.ctx.signup_repo().create(&signup).await? {
            // Lost a race with a duplicate submission; report the row that won
            let existing = self
                .ctx
                .signup_repo()
                .find(event_id, user_id)
                .await?
                .ok_or_else(|| ServiceError::internal("Signup vanished after insert conflict"))?;
            return Ok(SignupOutcome {
                performed: false,
                status: existing.status,
            });
        }

        info!(
            event_id = %event_id,
            user_id = %user_id,
            status = status.as_str(),
            "Signup created"
        );

        Ok(SignupOutcome {
            performed: true,
            status,
        })
    }

    /// Approve a signup (admin action).
    ///
    /// Allowed from `PendingApproval` or `PendingPayment`. Calling it again
    /// on an already approved signup reports `performed = false`, which
    /// guards double-click races.
    #[instrument(skip(self, notice))]
    pub async fn confirm(
        &self,
        event_id: EventId,
        user_id: UserId,
        admin_id: UserId,
        notice: Option<DecisionNotice>,
    ) -> ServiceResult<ConfirmOutcome> {
        let transition = self
            .ctx
            .signup_repo()
            .transition(
                event_id,
                user_id,
                &CONFIRMABLE,
                SignupStatus::Approved,
                admin_id,
                Utc::now(),
            )
            .await?
            .ok_or_else(|| signup_not_found(event_id, user_id))?;

        match transition {
            StatusTransition::Applied { .. } => {
                info!(
                    event_id = %event_id,
                    user_id = %user_id,
                    admin_id = %admin_id,
                    "Signup confirmed"
                );
                self.deliver_notice(notice).await;
                Ok(ConfirmOutcome { performed: true })
            }
            StatusTransition::Unchanged { current } => {
                info!(
                    event_id = %event_id,
                    user_id = %user_id,
                    current = current.as_str(),
                    "Confirm skipped, status not confirmable"
                );
                Ok(ConfirmOutcome { performed: false })
            }
        }
    }

    /// Reject a signup (admin action).
    ///
    /// Allowed from any non-rejected state. When the prior state was
    /// `Approved` the outcome carries `require_refund = true`.
    #[instrument(skip(self, notice))]
    pub async fn reject(
        &self,
        event_id: EventId,
        user_id: UserId,
        admin_id: UserId,
        notice: Option<DecisionNotice>,
    ) -> ServiceResult<RejectOutcome> {
        let transition = self
            .ctx
            .signup_repo()
            .transition(
                event_id,
                user_id,
                &REJECTABLE,
                SignupStatus::Rejected,
                admin_id,
                Utc::now(),
            )
            .await?
            .ok_or_else(|| signup_not_found(event_id, user_id))?;

        match transition {
            StatusTransition::Applied { prior, .. } => {
                let require_refund = prior == SignupStatus::Approved;
                info!(
                    event_id = %event_id,
                    user_id = %user_id,
                    admin_id = %admin_id,
                    require_refund,
                    "Signup rejected"
                );
                self.deliver_notice(notice).await;
                Ok(RejectOutcome {
                    performed: true,
                    require_refund,
                })
            }
            StatusTransition::Unchanged { .. } => Ok(RejectOutcome {
                performed: false,
                require_refund: false,
            }),
        }
    }

    /// Withdraw a signup (user action).
    ///
    /// Deletes the row so the user can sign up again fresh. The outcome
    /// carries `require_refund = true` when the removed row was approved or
    /// pending payment, since money may already have moved.
    #[instrument(skip(self))]
    pub async fn withdraw(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> ServiceResult<WithdrawOutcome> {
        let Some(removed) = self.ctx.signup_repo().delete(event_id, user_id).await? else {
            return Ok(WithdrawOutcome {
                performed: false,
                require_refund: false,
            });
        };

        let require_refund = removed.may_have_paid();
        info!(
            event_id = %event_id,
            user_id = %user_id,
            require_refund,
            "Signup withdrawn"
        );

        Ok(WithdrawOutcome {
            performed: true,
            require_refund,
        })
    }

    /// Record that the user confirmed attendance from the reminder reply
    /// flow. Idempotent.
    #[instrument(skip(self))]
    pub async fn confirm_participation(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> ServiceResult<()> {
        let updated = self
            .ctx
            .signup_repo()
            .set_participation_confirmed(event_id, user_id)
            .await?;

        if !updated {
            return Err(signup_not_found(event_id, user_id));
        }

        info!(event_id = %event_id, user_id = %user_id, "Participation confirmed");
        Ok(())
    }

    /// Send the decision notice, if any. Transport failures are logged and
    /// swallowed; the state transition has already committed and must not
    /// roll back.
    async fn deliver_notice(&self, notice: Option<DecisionNotice>) {
        let Some(notice) = notice else { return };

        if let Err(e) = self
            .ctx
            .messenger()
            .send_message(notice.chat, &notice.text, Default::default())
            .await
        {
            warn!(chat = %notice.chat, error = %e, "Failed to deliver decision notice");
        }
    }
}

fn signup_not_found(event_id: EventId, user_id: UserId) -> ServiceError {
    ServiceError::Domain(DomainError::SignupNotFound { event_id, user_id })
}
