//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

use crate::state::scenarios::DialogueConfig;

/// Database URL selecting the process-local store instead of PostgreSQL
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub dialogue: DialogueConfig,
    pub ticket: TicketConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    /// Whether state is kept in process memory
    pub fn is_in_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory of the daily-rolling log file
    pub file_path: String,
    /// Emit JSON lines on stdout
    #[serde(default)]
    pub json: bool,
}

/// Ticket rendering configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TicketConfig {
    /// PNG the ticket is drawn on; a blank canvas is used when absent
    pub template_path: Option<String>,
    /// TrueType font for the name and email lines; no text is drawn when absent
    pub font_path: Option<String>,
    pub font_size: f32,
    /// Avatar service URL with `{size}` and `{email}` placeholders
    pub avatar_url: Option<String>,
    pub avatar_size: u32,
    pub timeout_seconds: u64,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Load settings from an explicit TOML file, still honouring the environment
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Toml))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::TicketBuddyError> {
        super::validation::validate_settings(self)
    }
}

/// `TICKETBUDDY_` variables, nested keys separated by `__`
fn environment() -> config::Environment {
    config::Environment::with_prefix("TICKETBUDDY")
        .prefix_separator("_")
        .separator("__")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            dialogue: DialogueConfig::default(),
            ticket: TicketConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/ticketbuddy".to_string(),
            max_connections: 10,
            min_connections: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: "logs".to_string(),
            json: false,
        }
    }
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            font_path: None,
            font_size: 20.0,
            avatar_url: None,
            avatar_size: 80,
            timeout_seconds: 10,
        }
    }
}
