//! Bot handlers module
//!
//! This module contains the pieces the dialogue engine calls out to and the
//! Telegram endpoints that feed it:
//! - Validators gating scenario steps
//! - Artifact actions run when a step is entered
//! - The registry mapping handler names to implementations
//! - Message handlers for inbound updates

pub mod artifacts;
pub mod messages;
pub mod registry;
pub mod validators;

// Re-export commonly used handler types
pub use artifacts::{Artifact, ArtifactGenerator};
pub use messages::{handle_message, handle_unknown_update};
pub use registry::HandlerRegistry;
pub use validators::{EmailValidator, NameValidator, Validator};
