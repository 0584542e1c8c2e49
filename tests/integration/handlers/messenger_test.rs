//! Telegram messenger integration tests

use assert_matches::assert_matches;
use serial_test::serial;

use TicketBuddy::services::{Messenger, TelegramMessenger};
use TicketBuddy::TicketBuddyError;

use crate::helpers::TelegramMockServer;

#[tokio::test]
#[serial]
async fn test_send_text_calls_bot_api() {
    let telegram = TelegramMockServer::new().await;
    telegram.mock_send_message(true).await;

    let messenger = TelegramMessenger::new(telegram.bot());
    messenger.send_text("42", "Hello").await.unwrap();

    assert_eq!(telegram.request_count().await, 1);
}

#[tokio::test]
#[serial]
async fn test_blocked_user_is_a_telegram_error() {
    let telegram = TelegramMockServer::new().await;
    telegram.mock_send_message(false).await;

    let messenger = TelegramMessenger::new(telegram.bot());
    assert_matches!(messenger.send_text("42", "Hello").await, Err(TicketBuddyError::Telegram(_)));
}

#[tokio::test]
#[serial]
async fn test_invalid_user_id_never_reaches_api() {
    let telegram = TelegramMockServer::new().await;
    let messenger = TelegramMessenger::new(telegram.bot());

    assert_matches!(messenger.send_text("not-a-chat", "Hello").await, Err(TicketBuddyError::InvalidInput(_)));
    assert_eq!(telegram.request_count().await, 0);
}
