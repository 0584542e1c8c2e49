//! Mock Telegram API Server for testing
//!
//! This module provides a mock HTTP server that simulates the Telegram Bot API
//! for testing purposes. It uses wiremock to create configurable mock responses.

use serde_json::json;
use teloxide::Bot;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const TEST_BOT_TOKEN: &str = "12345:test_token";

/// Mock Telegram API server for testing
pub struct TelegramMockServer {
    pub server: MockServer,
}

impl TelegramMockServer {
    /// Create a new mock Telegram API server
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Bot pointed at this server
    pub fn bot(&self) -> Bot {
        let url = url::Url::parse(&self.server.uri()).unwrap();
        Bot::new(TEST_BOT_TOKEN).set_api_url(url)
    }

    /// Setup mock for sendMessage endpoint
    pub async fn mock_send_message(&self, success: bool) {
        let response = if success {
            ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {
                    "message_id": 123,
                    "from": {
                        "id": 12345,
                        "is_bot": true,
                        "first_name": "TicketBuddy",
                        "username": "ticketbuddy_bot"
                    },
                    "chat": {
                        "id": 42,
                        "first_name": "Bob",
                        "type": "private"
                    },
                    "date": 1640995200,
                    "text": "Test message"
                }
            }))
        } else {
            ResponseTemplate::new(403).set_body_json(json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            }))
        };

        Mock::given(method("POST"))
            .and(path(format!("/bot{}/SendMessage", TEST_BOT_TOKEN)))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Number of Bot API calls received so far
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map(|r| r.len()).unwrap_or(0)
    }
}
