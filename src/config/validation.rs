//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{TicketBuddyError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_logging_config(&settings.logging)?;
    validate_ticket_config(&settings.ticket)?;
    settings.dialogue.validate()?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.trim().is_empty() {
        return Err(TicketBuddyError::Config(
            "Bot token is required".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(TicketBuddyError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.is_in_memory() {
        return Ok(());
    }

    if config.max_connections == 0 {
        return Err(TicketBuddyError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(TicketBuddyError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(TicketBuddyError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(TicketBuddyError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if config.file_path.is_empty() {
        return Err(TicketBuddyError::Config(
            "Log directory is required".to_string()
        ));
    }

    Ok(())
}

/// Validate ticket configuration
fn validate_ticket_config(config: &super::TicketConfig) -> Result<()> {
    if config.timeout_seconds == 0 {
        return Err(TicketBuddyError::Config(
            "Ticket timeout must be greater than 0".to_string()
        ));
    }

    if config.font_size <= 0.0 {
        return Err(TicketBuddyError::Config(
            "Ticket font size must be greater than 0".to_string()
        ));
    }

    if let Some(font_path) = config.font_path.as_deref() {
        if !std::path::Path::new(font_path).is_file() {
            return Err(TicketBuddyError::Config(
                format!("Ticket font not found: {}", font_path)
            ));
        }
    }

    if let Some(avatar_url) = config.avatar_url.as_deref() {
        if config.avatar_size == 0 {
            return Err(TicketBuddyError::Config(
                "Avatar size must be greater than 0".to_string()
            ));
        }

        let sample = avatar_url.replace("{size}", "1").replace("{email}", "attendee");
        url::Url::parse(&sample)?;
    }

    Ok(())
}
