//! Reminder scheduler
//!
//! A single long-lived background loop that claims at most one due event
//! per cycle and fans out reminders to its approved signups. The loop is an
//! explicit Idle/Running/Stopping machine: it idles on a jittered timer,
//! runs one cycle to completion, and a cooperative stop either interrupts
//! the idle wait immediately or waits out the in-flight cycle. The claim
//! itself is the store's compare-and-set flip of `reminder_sent`, so two
//! processes can never remind the same event twice.

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use rand::Rng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use gather_common::ReminderConfig;
use gather_core::entities::{Event, EventSignup};
use gather_core::traits::SendOptions;
use gather_core::value_objects::EventId;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Wording for personalized reminders, supplied by the caller as plain
/// values (locale handling lives in the front end).
#[derive(Debug, Clone)]
pub struct ReminderCopy {
    /// First line of the personal reminder
    pub intro: String,
    /// Heading above the user's chosen participation options
    pub options_heading: String,
    /// Heading above the payment details block
    pub payment_heading: String,
    pub price_label: String,
    pub iban_label: String,
    pub recipient_label: String,
    /// Closing line asking the user to confirm attendance
    pub confirm_prompt: String,
}

impl Default for ReminderCopy {
    fn default() -> Self {
        Self {
            intro: "Reminder: you are signed up for this event.".to_string(),
            options_heading: "Your choices:".to_string(),
            payment_heading: "Payment details:".to_string(),
            price_label: "Price".to_string(),
            iban_label: "IBAN".to_string(),
            recipient_label: "Recipient".to_string(),
            confirm_prompt: "Please reply to confirm you are coming.".to_string(),
        }
    }
}

impl ReminderCopy {
    /// Build the personal reminder text for one signup
    pub fn compose(&self, event: &Event, signup: &EventSignup) -> String {
        let mut text = format!(
            "{}\n\n{}\n\n{}",
            self.intro,
            event.announcement,
            event.date.format("%A, %d %B %Y %H:%M UTC")
        );

        if !signup.options.is_empty() {
            text.push_str("\n\n");
            text.push_str(&self.options_heading);
            text.push(' ');
            text.push_str(&signup.options.join(", "));
        }

        if event.payment_due() {
            text.push_str("\n\n");
            text.push_str(&self.payment_heading);
            if let Some(price) = &event.price {
                text.push_str(&format!("\n{}: {price}", self.price_label));
            }
            if let Some(iban) = &event.iban {
                text.push_str(&format!("\n{}: {iban}", self.iban_label));
            }
            if let Some(recipient) = &event.recipient {
                text.push_str(&format!("\n{}: {recipient}", self.recipient_label));
            }
        }

        text.push_str("\n\n");
        text.push_str(&self.confirm_prompt);
        text
    }
}

/// Handle to the running reminder loop
pub struct ReminderScheduler {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ReminderScheduler {
    /// Spawn the background loop.
    ///
    /// At most one scheduler may run against a given store; the claim keeps
    /// a second instance harmless but it would burn cycles.
    pub fn start(ctx: ServiceContext, config: ReminderConfig, copy: ReminderCopy) -> Self {
        let cancel = CancellationToken::new();
        let worker = ReminderWorker {
            ctx,
            config,
            copy,
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(worker.run());
        Self { cancel, handle }
    }

    /// Stop the loop cooperatively.
    ///
    /// Resolves immediately when the loop is idling on its timer; when a
    /// cycle is in flight, resolves after that cycle's fan-out completes so
    /// a claimed event is never left half-notified.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Reminder worker ended abnormally");
        }
    }
}

struct ReminderWorker {
    ctx: ServiceContext,
    config: ReminderConfig,
    copy: ReminderCopy,
    cancel: CancellationToken,
}

impl ReminderWorker {
    async fn run(self) {
        info!(
            base_interval_secs = self.config.base_interval_secs,
            lead_hours = self.config.lead_hours,
            "Reminder scheduler started"
        );

        let mut next_delay = jittered(self.config.base_interval());
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(next_delay) => {}
            }

            // The cycle runs to completion even if stop is requested
            // meanwhile; cancellation is only observed between cycles.
            next_delay = match self.run_cycle().await {
                Ok(Some(event_id)) => {
                    debug!(event_id = %event_id, "Reminder cycle completed");
                    jittered(self.config.base_interval())
                }
                Ok(None) => jittered(self.config.base_interval()),
                Err(e) => {
                    warn!(
                        error = %e,
                        code = e.error_code(),
                        "Reminder cycle failed, backing off"
                    );
                    jittered(self.config.error_backoff())
                }
            };
        }

        info!("Reminder scheduler stopped");
    }

    /// One claim → announce → fan-out pass. Returns the claimed event id,
    /// or None when nothing was due.
    #[instrument(skip(self))]
    async fn run_cycle(&self) -> ServiceResult<Option<EventId>> {
        let now = Utc::now();
        let due_before = now + self.config.lead();

        let Some(event) = self
            .ctx
            .event_repo()
            .claim_due_for_reminder(due_before, now)
            .await?
        else {
            return Ok(None);
        };

        info!(event_id = %event.id, date = %event.date, "Claimed event for reminder fan-out");

        // Group announcement goes out before any personal reminder. A
        // failed announcement does not release the claim; the personal
        // fan-out still runs.
        self.send_jitter().await;
        if let Err(e) = self
            .ctx
            .messenger()
            .send_message(
                self.config.announce_chat(),
                &event.announcement,
                SendOptions::default(),
            )
            .await
        {
            warn!(event_id = %event.id, error = %e, "Failed to announce reminder in group");
        }

        let signups = self.ctx.signup_repo().approved_for_event(event.id).await?;
        let total = signups.len();

        let sends = signups
            .iter()
            .map(|signup| self.send_personal(&event, signup));
        let delivered = join_all(sends)
            .await
            .into_iter()
            .filter(|delivered| *delivered)
            .count();

        info!(event_id = %event.id, delivered, total, "Reminder fan-out finished");
        Ok(Some(event.id))
    }

    /// Deliver one personal reminder. Failures are logged and absorbed so
    /// one blocked recipient cannot stop the others.
    async fn send_personal(&self, event: &Event, signup: &EventSignup) -> bool {
        self.send_jitter().await;

        let text = self.copy.compose(event, signup);
        match self
            .ctx
            .messenger()
            .send_message(
                signup.user_id.into_private_chat(),
                &text,
                SendOptions::default(),
            )
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    event_id = %event.id,
                    user_id = %signup.user_id,
                    error = %e,
                    "Failed to deliver personal reminder"
                );
                false
            }
        }
    }

    /// Short random pause before an outbound send
    async fn send_jitter(&self) {
        let max = self.config.send_jitter_max();
        if max.is_zero() {
            return;
        }
        let delay = {
            let mut rng = rand::thread_rng();
            Duration::from_millis(rng.gen_range(0..=max.as_millis() as u64))
        };
        tokio::time::sleep(delay).await;
    }
}

/// A small random interval around `base` (±20%)
fn jittered(base: Duration) -> Duration {
    if base.is_zero() {
        return base;
    }
    let factor = rand::thread_rng().gen_range(0.8..1.2);
    base.mul_f64(factor)
}
