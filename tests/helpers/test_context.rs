//! Test context for unified test setup
//!
//! This module provides a unified test context that wires the dialogue engine
//! over in-memory storage, a recording messenger and a mock avatar service.

use std::sync::{Arc, Once};
use tempfile::TempDir;

use TicketBuddy::config::Settings;
use TicketBuddy::services::{DialogueEngine, MessageOutcome, ServiceFactory};
use TicketBuddy::state::{DialogueConfig, InMemoryStorage};

use super::{avatar_mock::AvatarMockServer, messenger_mock::RecordingMessenger, test_data::TestAttendee};

static INIT: Once = Once::new();

/// TrueType font shipped with the test fixtures
pub const TEST_FONT_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSans.ttf");

/// Initialize logging for tests (called once)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Unified test context that manages all test components
pub struct TestContext {
    pub engine: Arc<DialogueEngine>,
    pub storage: InMemoryStorage,
    pub messenger: Arc<RecordingMessenger>,
    pub avatar: AvatarMockServer,
    pub settings: Settings,
    pub temp_dir: TempDir,
}

impl TestContext {
    /// Context running the built-in registration dialogue
    pub async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::with_dialogue(DialogueConfig::default()).await
    }

    /// Context running a custom dialogue
    pub async fn with_dialogue(dialogue: DialogueConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::build(dialogue, AvatarMockServer::new(80).await).await
    }

    /// Context whose avatar service answers every request with an error
    pub async fn with_failing_avatars() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::build(DialogueConfig::default(), AvatarMockServer::failing().await).await
    }

    /// Context running exactly the given settings; the avatar mock is left unused
    pub async fn with_settings(settings: Settings) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        init_test_logging();
        Self::assemble(settings, AvatarMockServer::new(80).await, tempfile::tempdir()?)
    }

    async fn build(
        dialogue: DialogueConfig,
        avatar: AvatarMockServer,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        init_test_logging();

        let temp_dir = tempfile::tempdir()?;
        let settings = Self::create_test_settings(dialogue, &avatar, &temp_dir);
        Self::assemble(settings, avatar, temp_dir)
    }

    fn assemble(
        settings: Settings,
        avatar: AvatarMockServer,
        temp_dir: TempDir,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let storage = InMemoryStorage::new();
        let messenger = Arc::new(RecordingMessenger::new());
        let services = ServiceFactory::new(&settings, Arc::new(storage.clone()), messenger.clone())?;

        Ok(Self {
            engine: services.engine,
            storage,
            messenger,
            avatar,
            settings,
            temp_dir,
        })
    }

    fn create_test_settings(dialogue: DialogueConfig, avatar: &AvatarMockServer, temp_dir: &TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = super::telegram_mock::TEST_BOT_TOKEN.to_string();
        settings.database.url = "memory://".to_string();
        settings.logging.file_path = temp_dir.path().to_string_lossy().into_owned();
        settings.dialogue = dialogue;
        settings.ticket.avatar_url = Some(avatar.url_template());
        settings.ticket.font_path = Some(TEST_FONT_PATH.to_string());
        settings.ticket.timeout_seconds = 5;
        settings
    }

    /// Send one message as `user_id`
    pub async fn say(&self, user_id: &str, text: &str) -> TicketBuddy::Result<MessageOutcome> {
        self.engine.handle_message(user_id, text).await
    }

    /// Walk a user through the whole registration scenario
    pub async fn register(&self, user_id: &str, attendee: &TestAttendee) -> TicketBuddy::Result<MessageOutcome> {
        self.say(user_id, "I want to register").await?;
        self.say(user_id, &attendee.name).await?;
        self.say(user_id, &attendee.email).await
    }
}
