//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the TicketBuddy application.

use std::collections::BTreeMap;

use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::LoggingConfig;
use crate::utils::errors::{ErrorSeverity, Result, TicketBuddyError};
use crate::utils::helpers::truncate_text;

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "ticketbuddy.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(stdout_layer)
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| TicketBuddyError::Config(format!("Failed to install subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a scenario transition for a user
pub fn log_scenario_event(user_id: &str, scenario: &str, step: &str, event: &str) {
    info!(
        user_id = user_id,
        scenario = scenario,
        step = step,
        event = event,
        "Scenario event"
    );
}

/// Log a finished registration with its collected fields
pub fn log_registration(user_id: &str, scenario: &str, fields: &BTreeMap<String, String>) {
    info!(
        user_id = user_id,
        scenario = scenario,
        fields = ?fields,
        "Registration completed"
    );
}

/// Log a failure to handle a single inbound message
pub fn log_message_failure(user_id: &str, text: &str, error: &TicketBuddyError) {
    let text = truncate_text(text, 200);
    match error.severity() {
        ErrorSeverity::Info => debug!(
            user_id = user_id,
            text = %text,
            error = %error,
            "Message handling stopped"
        ),
        severity => error!(
            user_id = user_id,
            text = %text,
            error = %error,
            severity = %severity,
            recoverable = error.is_recoverable(),
            "Failed to handle message"
        ),
    }
}
