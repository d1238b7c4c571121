//! Engine integration tests
//!
//! Drive the signup state machine and the message mirror end to end over
//! the in-memory fakes.

use integration_tests::{test_user, upcoming_event, TestEngine};

use gather_core::entities::{PaymentPolicy, SignupStatus};
use gather_core::traits::{EditPayload, EventRepository, SignupRepository};
use gather_core::value_objects::{ChatId, MessageId};
use gather_service::{
    DecisionNotice, MirrorService, OriginEdit, OriginMessage, ReplyPolicy, ServiceError,
    SignupService,
};

// ============================================================================
// Signup state machine
// ============================================================================

#[tokio::test]
async fn test_free_event_signup_is_approved_and_idempotent() {
    let engine = TestEngine::new();
    let service = SignupService::new(&engine.ctx);

    let event = engine
        .events
        .create(&upcoming_event(48))
        .await
        .unwrap();
    let user = test_user();

    let outcome = service.signup(event.id, user, Vec::new()).await.unwrap();
    assert!(outcome.performed);
    assert_eq!(outcome.status, SignupStatus::Approved);

    // Double submission is a no-op
    let outcome = service.signup(event.id, user, Vec::new()).await.unwrap();
    assert!(!outcome.performed);
    assert_eq!(outcome.status, SignupStatus::Approved);
}

#[tokio::test]
async fn test_donation_with_price_parks_at_pending_payment() {
    let engine = TestEngine::new();
    let service = SignupService::new(&engine.ctx);

    let event = engine
        .events
        .create(&upcoming_event(48).with_payment(PaymentPolicy::Donation, Some("50".to_string())))
        .await
        .unwrap();
    let user = test_user();
    let admin = test_user();

    let outcome = service.signup(event.id, user, Vec::new()).await.unwrap();
    assert!(outcome.performed);
    assert_eq!(outcome.status, SignupStatus::PendingPayment);

    let confirm = service.confirm(event.id, user, admin, None).await.unwrap();
    assert!(confirm.performed);

    let stored = engine.signups.find(event.id, user).await.unwrap().unwrap();
    assert_eq!(stored.status, SignupStatus::Approved);
    assert_eq!(stored.decided_by, Some(admin));
    assert!(stored.decided_at.is_some());
}

#[tokio::test]
async fn test_approval_required_event_parks_at_pending_approval() {
    let engine = TestEngine::new();
    let service = SignupService::new(&engine.ctx);

    let event = engine
        .events
        .create(&upcoming_event(48).with_approval(true))
        .await
        .unwrap();

    let outcome = service
        .signup(event.id, test_user(), vec!["follower".to_string()])
        .await
        .unwrap();
    assert_eq!(outcome.status, SignupStatus::PendingApproval);
}

#[tokio::test]
async fn test_confirm_twice_performs_once() {
    let engine = TestEngine::new();
    let service = SignupService::new(&engine.ctx);

    let event = engine
        .events
        .create(&upcoming_event(48).with_approval(true))
        .await
        .unwrap();
    let user = test_user();
    let admin = test_user();

    service.signup(event.id, user, Vec::new()).await.unwrap();

    let first = service.confirm(event.id, user, admin, None).await.unwrap();
    let second = service.confirm(event.id, user, admin, None).await.unwrap();

    assert!(first.performed);
    assert!(!second.performed);

    let stored = engine.signups.find(event.id, user).await.unwrap().unwrap();
    assert_eq!(stored.status, SignupStatus::Approved);
}

#[tokio::test]
async fn test_reject_refund_depends_on_prior_status() {
    let engine = TestEngine::new();
    let service = SignupService::new(&engine.ctx);

    let event = engine
        .events
        .create(&upcoming_event(48).with_approval(true))
        .await
        .unwrap();
    let admin = test_user();

    // Rejecting an approved signup flags a refund
    let paid_user = test_user();
    service.signup(event.id, paid_user, Vec::new()).await.unwrap();
    service
        .confirm(event.id, paid_user, admin, None)
        .await
        .unwrap();
    let outcome = service
        .reject(event.id, paid_user, admin, None)
        .await
        .unwrap();
    assert!(outcome.performed);
    assert!(outcome.require_refund);

    // Rejecting straight from pending approval does not
    let fresh_user = test_user();
    service
        .signup(event.id, fresh_user, Vec::new())
        .await
        .unwrap();
    let outcome = service
        .reject(event.id, fresh_user, admin, None)
        .await
        .unwrap();
    assert!(outcome.performed);
    assert!(!outcome.require_refund);

    // Rejecting twice performs once
    let outcome = service
        .reject(event.id, fresh_user, admin, None)
        .await
        .unwrap();
    assert!(!outcome.performed);
    assert!(!outcome.require_refund);
}

#[tokio::test]
async fn test_decision_notice_sent_only_when_performed() {
    let engine = TestEngine::new();
    let service = SignupService::new(&engine.ctx);

    let event = engine
        .events
        .create(&upcoming_event(48).with_approval(true))
        .await
        .unwrap();
    let user = test_user();
    let admin = test_user();

    service.signup(event.id, user, Vec::new()).await.unwrap();

    let notice = || Some(DecisionNotice::for_user(user, "You are in!"));

    service
        .confirm(event.id, user, admin, notice())
        .await
        .unwrap();
    service
        .confirm(event.id, user, admin, notice())
        .await
        .unwrap();

    // The duplicated confirm performed nothing, so no duplicate notification
    let delivered = engine.messenger.sent_to(user.into_private_chat());
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].text, "You are in!");
}

#[tokio::test]
async fn test_notice_failure_does_not_roll_back_transition() {
    let engine = TestEngine::new();
    let service = SignupService::new(&engine.ctx);

    let event = engine
        .events
        .create(&upcoming_event(48).with_approval(true))
        .await
        .unwrap();
    let user = test_user();
    let admin = test_user();

    service.signup(event.id, user, Vec::new()).await.unwrap();
    engine.messenger.refuse_chat(user.into_private_chat());

    let outcome = service
        .confirm(
            event.id,
            user,
            admin,
            Some(DecisionNotice::for_user(user, "You are in!")),
        )
        .await
        .unwrap();

    assert!(outcome.performed);
    let stored = engine.signups.find(event.id, user).await.unwrap().unwrap();
    assert_eq!(stored.status, SignupStatus::Approved);
}

#[tokio::test]
async fn test_withdraw_deletes_row_and_flags_refund() {
    let engine = TestEngine::new();
    let service = SignupService::new(&engine.ctx);

    let event = engine
        .events
        .create(&upcoming_event(48).with_payment(PaymentPolicy::Required, Some("15".to_string())))
        .await
        .unwrap();
    let user = test_user();

    service.signup(event.id, user, Vec::new()).await.unwrap();

    // Pending payment: money may already have moved
    let outcome = service.withdraw(event.id, user).await.unwrap();
    assert!(outcome.performed);
    assert!(outcome.require_refund);
    assert!(engine.signups.find(event.id, user).await.unwrap().is_none());

    // Nothing left to withdraw
    let outcome = service.withdraw(event.id, user).await.unwrap();
    assert!(!outcome.performed);
    assert!(!outcome.require_refund);

    // A withdrawn user can sign up again fresh
    let outcome = service.signup(event.id, user, Vec::new()).await.unwrap();
    assert!(outcome.performed);
}

#[tokio::test]
async fn test_signup_rejected_when_registration_closed_or_cancelled() {
    let engine = TestEngine::new();
    let service = SignupService::new(&engine.ctx);

    let mut template = upcoming_event(48);
    template.registration_open = false;
    let closed = engine.events.create(&template).await.unwrap();

    let err = service
        .signup(closed.id, test_user(), Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "REGISTRATION_CLOSED");

    let mut template = upcoming_event(48);
    template.cancelled = true;
    let cancelled = engine.events.create(&template).await.unwrap();

    let err = service
        .signup(cancelled.id, test_user(), Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "EVENT_CANCELLED");
}

#[tokio::test]
async fn test_operations_on_unknown_rows_report_not_found() {
    let engine = TestEngine::new();
    let service = SignupService::new(&engine.ctx);

    let err = service
        .signup(gather_core::EventId::new(424_242), test_user(), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));

    let event = engine.events.create(&upcoming_event(48)).await.unwrap();
    let admin = test_user();

    let err = service
        .confirm(event.id, test_user(), admin, None)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_SIGNUP");

    let err = service
        .reject(event.id, test_user(), admin, None)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_SIGNUP");
}

#[tokio::test]
async fn test_participation_confirmation_is_idempotent() {
    let engine = TestEngine::new();
    let service = SignupService::new(&engine.ctx);

    let event = engine.events.create(&upcoming_event(48)).await.unwrap();
    let user = test_user();

    service.signup(event.id, user, Vec::new()).await.unwrap();

    service.confirm_participation(event.id, user).await.unwrap();
    service.confirm_participation(event.id, user).await.unwrap();

    let stored = engine.signups.find(event.id, user).await.unwrap().unwrap();
    assert!(stored.participation_confirmed);

    let err = service
        .confirm_participation(event.id, test_user())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_SIGNUP");
}

// ============================================================================
// Message mirror
// ============================================================================

#[tokio::test]
async fn test_relay_records_link_and_copy() {
    let engine = TestEngine::new();
    let mirror = MirrorService::new(&engine.ctx);

    let origin = OriginMessage::new(MessageId::new(10), ChatId::new(100));
    let destination = ChatId::new(-200);

    let copy_id = mirror.relay(&origin, destination, ReplyPolicy::Threaded).await.unwrap();

    let copies = engine.messenger.copied();
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].id, copy_id);
    assert_eq!(copies[0].to_chat, destination);
    assert_eq!(copies[0].reply_to, None);

    let links = engine.mirror.all();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].origin_id, origin.id);
    assert_eq!(links[0].destination_id, copy_id);
    assert_eq!(links[0].destination_chat_id, destination);
}

#[tokio::test]
async fn test_relay_threads_reply_through_prior_link() {
    let engine = TestEngine::new();
    let mirror = MirrorService::new(&engine.ctx);

    let origin_chat = ChatId::new(100);
    let destination = ChatId::new(-200);

    // Message A relayed to C as A'
    let a = OriginMessage::new(MessageId::new(10), origin_chat);
    let a_copy = mirror.relay(&a, destination, ReplyPolicy::Threaded).await.unwrap();

    // B replies to A; its copy must thread under A'
    let b = OriginMessage::reply(MessageId::new(11), origin_chat, a.id);
    mirror.relay(&b, destination, ReplyPolicy::Threaded).await.unwrap();

    let copies = engine.messenger.copied();
    assert_eq!(copies.len(), 2);
    assert_eq!(copies[1].reply_to, Some(a_copy));
}

#[tokio::test]
async fn test_relay_of_reply_without_prior_link_is_unthreaded() {
    let engine = TestEngine::new();
    let mirror = MirrorService::new(&engine.ctx);

    let b = OriginMessage::reply(MessageId::new(11), ChatId::new(100), MessageId::new(10));
    mirror.relay(&b, ChatId::new(-200), ReplyPolicy::Threaded).await.unwrap();

    let copies = engine.messenger.copied();
    assert_eq!(copies[0].reply_to, None);
}

#[tokio::test]
async fn test_unthreaded_policy_ignores_prior_link() {
    let engine = TestEngine::new();
    let mirror = MirrorService::new(&engine.ctx);

    let origin_chat = ChatId::new(100);
    let destination = ChatId::new(-200);

    let a = OriginMessage::new(MessageId::new(10), origin_chat);
    mirror
        .relay(&a, destination, ReplyPolicy::Threaded)
        .await
        .unwrap();

    let b = OriginMessage::reply(MessageId::new(11), origin_chat, a.id);
    mirror
        .relay(&b, destination, ReplyPolicy::Unthreaded)
        .await
        .unwrap();

    let copies = engine.messenger.copied();
    assert_eq!(copies[1].reply_to, None);
}

#[tokio::test]
async fn test_edit_fans_out_to_all_destinations_despite_failure() {
    let engine = TestEngine::new();
    let mirror = MirrorService::new(&engine.ctx);

    let origin = OriginMessage::new(MessageId::new(10), ChatId::new(100));
    let chats = [ChatId::new(-201), ChatId::new(-202), ChatId::new(-203)];
    for chat in chats {
        mirror.relay(&origin, chat, ReplyPolicy::Threaded).await.unwrap();
    }

    // One destination refuses the edit
    engine.messenger.refuse_chat(chats[1]);

    let edit = OriginEdit {
        id: origin.id,
        chat_id: origin.chat_id,
        content: EditPayload::Text("updated text".to_string()),
        edited_at: chrono::Utc::now(),
    };
    let report = mirror.propagate_edit(&edit).await.unwrap();

    // Exactly one attempt per destination, the failure did not stop the rest
    assert_eq!(report.attempted, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(report.applied(), 2);

    let edits = engine.messenger.edits();
    assert_eq!(edits.len(), 3);
    for attempt in &edits {
        assert!(attempt.content.text().starts_with("updated text"));
        assert!(attempt.content.text().contains("edited "));
    }
}

#[tokio::test]
async fn test_unchanged_edit_counts_as_success() {
    let engine = TestEngine::new();
    let mirror = MirrorService::new(&engine.ctx);

    let origin = OriginMessage::new(MessageId::new(10), ChatId::new(100));
    let destination = ChatId::new(-200);
    mirror.relay(&origin, destination, ReplyPolicy::Threaded).await.unwrap();

    engine.messenger.answer_unchanged(destination);

    let edit = OriginEdit {
        id: origin.id,
        chat_id: origin.chat_id,
        content: EditPayload::Caption("same caption".to_string()),
        edited_at: chrono::Utc::now(),
    };
    let report = mirror.propagate_edit(&edit).await.unwrap();

    assert_eq!(report.attempted, 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_reaction_propagates_with_failure_isolation() {
    let engine = TestEngine::new();
    let mirror = MirrorService::new(&engine.ctx);

    let origin = OriginMessage::new(MessageId::new(10), ChatId::new(100));
    let good = ChatId::new(-201);
    let bad = ChatId::new(-202);
    mirror.relay(&origin, good, ReplyPolicy::Threaded).await.unwrap();
    mirror.relay(&origin, bad, ReplyPolicy::Threaded).await.unwrap();

    engine.messenger.refuse_chat(bad);

    let report = mirror
        .propagate_reaction(origin.id, origin.chat_id, "👍")
        .await
        .unwrap();

    assert_eq!(report.attempted, 2);
    assert_eq!(report.failed, 1);

    let reactions = engine.messenger.reactions();
    assert_eq!(reactions.len(), 2);
    assert!(reactions.iter().all(|r| r.emoji == "👍"));
}
