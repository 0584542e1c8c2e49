//! Outbound messaging
//!
//! The dialogue engine talks to the chat platform only through [`Messenger`].
//! [`TelegramMessenger`] is the production implementation on top of teloxide.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use tracing::debug;

use crate::handlers::artifacts::Artifact;
use crate::utils::errors::{Result, TicketBuddyError};

/// Delivery of replies to a user
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, user_id: &str, text: &str) -> Result<()>;

    async fn send_image(&self, user_id: &str, artifact: &Artifact) -> Result<()>;
}

/// Telegram delivery through the Bot API
#[derive(Debug, Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn chat_id(user_id: &str) -> Result<ChatId> {
        user_id
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| TicketBuddyError::InvalidInput(format!("Not a Telegram chat id: {}", user_id)))
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, user_id: &str, text: &str) -> Result<()> {
        let chat_id = Self::chat_id(user_id)?;
        self.bot.send_message(chat_id, text).await?;
        debug!(user_id = user_id, length = text.len(), "Text message sent");
        Ok(())
    }

    async fn send_image(&self, user_id: &str, artifact: &Artifact) -> Result<()> {
        let chat_id = Self::chat_id(user_id)?;
        let photo = InputFile::memory(artifact.bytes.clone()).file_name(artifact.file_name.clone());
        self.bot.send_photo(chat_id, photo).await?;
        debug!(user_id = user_id, file_name = %artifact.file_name, size = artifact.bytes.len(), "Image sent");
        Ok(())
    }
}
