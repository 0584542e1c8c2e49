//! Message handler integration tests

use TicketBuddy::handlers::messages::{handle_message, user_id_of};
use TicketBuddy::middleware::LoggingMiddleware;

use crate::helpers::{create_photo_message, create_text_message, TestContext};

#[tokio::test]
async fn test_chat_id_is_the_conversation_key() {
    let ctx = TestContext::new().await.expect("Failed to create test context");
    let msg = create_text_message(424242, "register");

    assert_eq!(user_id_of(&msg), "424242");
    handle_message(msg, ctx.engine.clone(), LoggingMiddleware::default()).await.unwrap();

    assert_eq!(ctx.storage.user_state("424242").unwrap().step_name, "step1");
}

#[tokio::test]
async fn test_non_text_message_is_empty_input() {
    let ctx = TestContext::new().await.expect("Failed to create test context");

    ctx.say("424243", "register").await.unwrap();
    ctx.messenger.take("424243");

    // A photo fails the name validator like any empty text would
    handle_message(create_photo_message(424243), ctx.engine.clone(), LoggingMiddleware::default())
        .await
        .unwrap();

    assert_eq!(ctx.storage.user_state("424243").unwrap().step_name, "step1");
    assert_eq!(
        ctx.messenger.take_texts("424243"),
        vec!["A name is 3-30 characters: letters, digits, hyphens and spaces. Please try again."]
    );
}

#[tokio::test]
async fn test_engine_errors_do_not_escape() {
    let ctx = TestContext::new().await.expect("Failed to create test context");
    ctx.messenger.fail_all(true);

    let result = handle_message(
        create_text_message(424244, "hello"),
        ctx.engine.clone(),
        LoggingMiddleware::new(true, false),
    ).await;

    assert!(result.is_ok());
    assert!(ctx.storage.user_state("424244").is_none());
}
