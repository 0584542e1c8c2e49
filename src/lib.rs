//! TicketBuddy Telegram Bot
//!
//! A scripted-dialogue Telegram bot for conference registration. Keyword
//! intents answer common questions or start a scenario; scenarios walk the
//! user through validated steps and finish with a stored registration and a
//! rendered ticket.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod state;
pub mod utils;
pub mod middleware;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{TicketBuddyError, Result};

// Re-export main components for easy access
pub use database::PostgresStorage;
pub use services::{DialogueEngine, ServiceFactory};
pub use state::{DialogueConfig, InMemoryStorage, ScenarioManager};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
