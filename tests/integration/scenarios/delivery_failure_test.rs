//! Failure handling integration tests
//!
//! A message whose replies cannot be delivered, or whose ticket cannot be
//! rendered, must leave the stored state exactly as it was.

use assert_matches::assert_matches;

use TicketBuddy::services::MessageOutcome;
use TicketBuddy::TicketBuddyError;

use crate::helpers::{TestAttendee, TestContext};

#[tokio::test]
async fn test_failed_send_does_not_start_scenario() {
    let ctx = TestContext::new().await.expect("Failed to create test context");

    ctx.messenger.fail_all(true);
    assert_matches!(ctx.say("700001", "register").await, Err(TicketBuddyError::Io(_)));
    assert!(ctx.storage.user_state("700001").is_none());

    // The user retries once delivery works again
    ctx.messenger.fail_all(false);
    let outcome = ctx.say("700001", "register").await.unwrap();
    assert_matches!(outcome, MessageOutcome::ScenarioStarted { .. });
}

#[tokio::test]
async fn test_failed_ticket_delivery_keeps_user_on_step() {
    let ctx = TestContext::new().await.expect("Failed to create test context");
    let attendee = TestAttendee::new("Bob Smith", "bob@example.com");

    ctx.say("700002", "register").await.unwrap();
    ctx.say("700002", &attendee.name).await.unwrap();
    let before = ctx.storage.user_state("700002").unwrap();

    ctx.messenger.fail_images(true);
    assert!(ctx.say("700002", &attendee.email).await.is_err());

    // Nothing recorded, state unchanged
    assert!(ctx.storage.registrations().is_empty());
    assert_eq!(ctx.storage.user_state("700002").unwrap(), before);

    ctx.messenger.fail_images(false);
    let outcome = ctx.say("700002", &attendee.email).await.unwrap();
    assert_matches!(outcome, MessageOutcome::ScenarioCompleted { .. });
    assert_eq!(ctx.storage.registrations().len(), 1);
}

#[tokio::test]
async fn test_avatar_outage_aborts_completion() {
    let ctx = TestContext::with_failing_avatars().await.expect("Failed to create test context");
    let attendee = TestAttendee::fake();

    assert_matches!(ctx.register("700003", &attendee).await, Err(TicketBuddyError::Http(_)));

    let state = ctx.storage.user_state("700003").unwrap();
    assert_eq!(state.step_name, "step2");
    assert_eq!(state.context.get("name"), Some(attendee.name.as_str()));
    assert!(ctx.storage.registrations().is_empty());

    // No reply went out for the failed message
    let texts = ctx.messenger.take_texts("700003");
    assert_eq!(texts.len(), 2);
}
