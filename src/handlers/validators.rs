//! Input validation handlers
//!
//! A validator inspects the raw message text of the current step. On success
//! it writes the fields it owns into the context; on failure it leaves the
//! context untouched. Malformed or empty input is a normal `false`.

use regex::Regex;

use crate::state::context::ConversationContext;
use crate::utils::errors::{Result, TicketBuddyError};

const NAME_PATTERN: &str = r"^[\w\-\s]{3,30}$";
const EMAIL_PATTERN: &str = r"\b[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+\b";

/// Gate on the transition out of a step
pub trait Validator: Send + Sync {
    fn validate(&self, text: &str, context: &mut ConversationContext) -> bool;
}

impl std::fmt::Debug for dyn Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<dyn Validator>")
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| TicketBuddyError::Config(format!("Invalid regex pattern '{}': {}", pattern, e)))
}

/// Accepts 3-30 word characters, hyphens and spaces; stores `name`
#[derive(Debug, Clone)]
pub struct NameValidator {
    pattern: Regex,
}

impl NameValidator {
    pub const FIELD: &'static str = "name";

    pub fn new() -> Result<Self> {
        Ok(Self { pattern: compile(NAME_PATTERN)? })
    }
}

impl Validator for NameValidator {
    fn validate(&self, text: &str, context: &mut ConversationContext) -> bool {
        if self.pattern.is_match(text) {
            context.set(Self::FIELD, text);
            true
        } else {
            false
        }
    }
}

/// Extracts the first email-looking substring of free text; stores `email`
#[derive(Debug, Clone)]
pub struct EmailValidator {
    pattern: Regex,
}

impl EmailValidator {
    pub const FIELD: &'static str = "email";

    pub fn new() -> Result<Self> {
        Ok(Self { pattern: compile(EMAIL_PATTERN)? })
    }
}

impl Validator for EmailValidator {
    fn validate(&self, text: &str, context: &mut ConversationContext) -> bool {
        match self.pattern.find(text) {
            Some(found) => {
                context.set(Self::FIELD, found.as_str());
                true
            }
            None => false,
        }
    }
}
