//! State management module
//!
//! This module handles the dialogue definition, per-user conversation state
//! and the transactional storage behind it

pub mod context;
pub mod scenarios;
pub mod storage;

// Re-export commonly used state components
pub use context::ConversationContext;
pub use scenarios::{DialogueConfig, Intent, IntentAction, Scenario, ScenarioManager, ScenarioStep};
pub use storage::{DialogueStorage, DialogueTransaction, InMemoryStorage};
