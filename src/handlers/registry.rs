//! Handler registry
//!
//! Steps name their validator and action as strings. The registry maps those
//! names to implementations once at startup; [`HandlerRegistry::verify`]
//! rejects a dialogue that references a name nobody registered.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handlers::artifacts::ArtifactGenerator;
use crate::handlers::validators::{EmailValidator, NameValidator, Validator};
use crate::state::scenarios::DialogueConfig;
use crate::utils::errors::{Result, TicketBuddyError};

pub const HANDLE_NAME: &str = "handle_name";
pub const HANDLE_EMAIL: &str = "handle_email";
pub const GENERATE_TICKET: &str = "generate_ticket";

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    validators: HashMap<String, Arc<dyn Validator>>,
    generators: HashMap<String, Arc<dyn ArtifactGenerator>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in name and email validators
    pub fn with_default_validators() -> Result<Self> {
        let mut registry = Self::new();
        registry.register_validator(HANDLE_NAME, Arc::new(NameValidator::new()?));
        registry.register_validator(HANDLE_EMAIL, Arc::new(EmailValidator::new()?));
        Ok(registry)
    }

    pub fn register_validator(&mut self, name: impl Into<String>, validator: Arc<dyn Validator>) -> &mut Self {
        self.validators.insert(name.into(), validator);
        self
    }

    pub fn register_generator(&mut self, name: impl Into<String>, generator: Arc<dyn ArtifactGenerator>) -> &mut Self {
        self.generators.insert(name.into(), generator);
        self
    }

    pub fn validator(&self, name: &str) -> Result<&Arc<dyn Validator>> {
        self.validators
            .get(name)
            .ok_or_else(|| TicketBuddyError::UnknownHandler(name.to_string()))
    }

    pub fn generator(&self, name: &str) -> Result<&Arc<dyn ArtifactGenerator>> {
        self.generators
            .get(name)
            .ok_or_else(|| TicketBuddyError::UnknownHandler(name.to_string()))
    }

    /// Check that every handler and action named by the dialogue is registered
    pub fn verify(&self, dialogue: &DialogueConfig) -> Result<()> {
        let (validators, actions) = dialogue.referenced_handlers();
        for name in validators {
            self.validator(name)?;
        }
        for name in actions {
            self.generator(name)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut validators: Vec<_> = self.validators.keys().collect();
        let mut generators: Vec<_> = self.generators.keys().collect();
        validators.sort();
        generators.sort();
        f.debug_struct("HandlerRegistry")
            .field("validators", &validators)
            .field("generators", &generators)
            .finish()
    }
}
