//! Message handlers module
//!
//! Routes inbound Telegram messages into the dialogue engine

use std::sync::Arc;

use teloxide::types::{Message, Update};
use tracing::debug;

use crate::middleware::LoggingMiddleware;
use crate::services::dialogue::DialogueEngine;
use crate::utils::errors::Result;
use crate::utils::logging::log_message_failure;

/// Conversation key of a message: the chat it arrived in
pub fn user_id_of(msg: &Message) -> String {
    msg.chat.id.0.to_string()
}

/// Handle incoming messages
///
/// Failures are logged with the user and text; the update loop keeps going.
pub async fn handle_message(
    msg: Message,
    engine: Arc<DialogueEngine>,
    logging: LoggingMiddleware,
) -> Result<()> {
    logging.log_message(&msg);

    let user_id = user_id_of(&msg);
    // Non-text messages take part in the dialogue as empty input
    let text = msg.text().unwrap_or_default();
    let tracker = logging.track("handle_message");

    let result = engine.handle_message(&user_id, text).await;
    let success = result.is_ok();
    match result {
        Ok(outcome) => debug!(user_id = %user_id, outcome = ?outcome, "Message processed"),
        Err(e) => log_message_failure(&user_id, text, &e),
    }

    if let Some(tracker) = tracker {
        tracker.complete(success);
    }

    Ok(())
}

/// Handle every update kind other than messages
pub async fn handle_unknown_update(update: Arc<Update>, logging: LoggingMiddleware) {
    logging.log_update(&update);
}
