//! Test data helpers for creating test objects
//!
//! This module provides helpers for creating attendees and inbound Telegram
//! messages.

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use serde_json::json;
use teloxide::types::Message;

/// Attendee details accepted by the registration validators
#[derive(Debug, Clone)]
pub struct TestAttendee {
    pub name: String,
    pub email: String,
}

impl TestAttendee {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    /// Random attendee, filtered to what the name validator accepts
    pub fn fake() -> Self {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let name: String = format!("{} {}", first, last)
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
            .take(30)
            .collect();
        let name = if name.chars().count() < 3 { "Test Attendee".to_string() } else { name };

        Self {
            name,
            email: SafeEmail().fake(),
        }
    }
}

/// Inbound private text message from `chat_id`
pub fn create_text_message(chat_id: i64, text: &str) -> Message {
    serde_json::from_value(json!({
        "message_id": 1,
        "date": 1640995200,
        "chat": { "id": chat_id, "first_name": "Bob", "type": "private" },
        "from": { "id": chat_id, "is_bot": false, "first_name": "Bob" },
        "text": text
    }))
    .expect("valid message json")
}

/// Inbound private photo message without caption from `chat_id`
pub fn create_photo_message(chat_id: i64) -> Message {
    serde_json::from_value(json!({
        "message_id": 2,
        "date": 1640995200,
        "chat": { "id": chat_id, "first_name": "Bob", "type": "private" },
        "from": { "id": chat_id, "is_bot": false, "first_name": "Bob" },
        "photo": [{
            "file_id": "photo-file",
            "file_unique_id": "photo-unique",
            "file_size": 1024,
            "width": 90,
            "height": 90
        }]
    }))
    .expect("valid message json")
}
