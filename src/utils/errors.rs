//! Error handling for TicketBuddy
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for TicketBuddy application
#[derive(Error, Debug)]
pub enum TicketBuddyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Dialogue definition error: {0}")]
    DialogueDefinition(#[from] toml::de::Error),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Unknown step '{step}' in scenario '{scenario}'")]
    UnknownStep { scenario: String, step: String },

    #[error("No handler registered under '{0}'")]
    UnknownHandler(String),

    #[error("User {user_id} already has an active scenario")]
    UserStateExists { user_id: String },

    #[error("No active scenario for user {user_id}")]
    UserStateNotFound { user_id: String },

    #[error("Artifact generation failed: {0}")]
    Artifact(String),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Template rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template '{template}' references missing field '{field}'")]
    MissingField { field: String, template: String },

    #[error("Template '{template}' is malformed at byte {position}")]
    Malformed { template: String, position: usize },
}

/// Result type alias for TicketBuddy operations
pub type Result<T> = std::result::Result<T, TicketBuddyError>;

impl TicketBuddyError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            TicketBuddyError::Database(_) => true,
            TicketBuddyError::Migration(_) => false,
            TicketBuddyError::Telegram(_) => true,
            TicketBuddyError::Config(_) => false,
            TicketBuddyError::ConfigSource(_) => false,
            TicketBuddyError::DialogueDefinition(_) => false,
            TicketBuddyError::Template(_) => false,
            TicketBuddyError::UnknownScenario(_) => false,
            TicketBuddyError::UnknownStep { .. } => false,
            TicketBuddyError::UnknownHandler(_) => false,
            TicketBuddyError::UserStateExists { .. } => true,
            TicketBuddyError::UserStateNotFound { .. } => true,
            TicketBuddyError::Artifact(_) => true,
            TicketBuddyError::Image(_) => false,
            TicketBuddyError::Storage(_) => true,
            TicketBuddyError::Http(_) => true,
            TicketBuddyError::Serialization(_) => false,
            TicketBuddyError::Io(_) => true,
            TicketBuddyError::UrlParse(_) => false,
            TicketBuddyError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TicketBuddyError::Migration(_) => ErrorSeverity::Critical,
            TicketBuddyError::Config(_) => ErrorSeverity::Critical,
            TicketBuddyError::ConfigSource(_) => ErrorSeverity::Critical,
            TicketBuddyError::DialogueDefinition(_) => ErrorSeverity::Critical,
            TicketBuddyError::Template(_) => ErrorSeverity::Critical,
            TicketBuddyError::UnknownScenario(_) => ErrorSeverity::Critical,
            TicketBuddyError::UnknownStep { .. } => ErrorSeverity::Critical,
            TicketBuddyError::UnknownHandler(_) => ErrorSeverity::Critical,
            TicketBuddyError::UserStateExists { .. } => ErrorSeverity::Warning,
            TicketBuddyError::UserStateNotFound { .. } => ErrorSeverity::Warning,
            TicketBuddyError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
