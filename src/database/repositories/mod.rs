//! Database repositories
//!
//! This module contains repository implementations for the dialogue tables

pub mod registration;
pub mod user_state;

pub use registration::RegistrationRepository;
pub use user_state::UserStateRepository;
