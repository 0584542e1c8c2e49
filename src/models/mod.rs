//! Data models module
//!
//! This module contains the persisted records of the dialogue engine

pub mod registration;
pub mod user_state;

// Re-export commonly used models
pub use registration::{Registration, NewRegistration};
pub use user_state::{UserState, NewUserState};
