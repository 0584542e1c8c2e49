//! Services module
//!
//! This module contains business logic services

pub mod dialogue;
pub mod messenger;
pub mod ticket;

// Re-export commonly used services
pub use dialogue::{DialogueEngine, MessageOutcome, Reply};
pub use messenger::{Messenger, TelegramMessenger};
pub use ticket::TicketGenerator;

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::handlers::registry::{HandlerRegistry, GENERATE_TICKET};
use crate::state::scenarios::ScenarioManager;
use crate::state::storage::DialogueStorage;
use crate::utils::errors::Result;

/// Service factory wiring the dialogue engine from settings
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub engine: Arc<DialogueEngine>,
}

impl ServiceFactory {
    /// Create the engine with the built-in validators and the ticket action
    pub fn new(
        settings: &Settings,
        storage: Arc<dyn DialogueStorage>,
        messenger: Arc<dyn Messenger>,
    ) -> Result<Self> {
        let scenarios = ScenarioManager::new(settings.dialogue.clone())?;

        let mut handlers = HandlerRegistry::with_default_validators()?;
        handlers.register_generator(GENERATE_TICKET, Arc::new(TicketGenerator::new(settings.ticket.clone())?));

        let engine = DialogueEngine::new(scenarios, handlers, storage, messenger)?;

        Ok(Self {
            engine: Arc::new(engine),
        })
    }
}
