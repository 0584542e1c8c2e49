//! Conversation context management
//!
//! The context accumulates validated user input while a scenario runs. It is
//! a flat string-to-string map persisted alongside the user's state and used
//! to render step templates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::errors::TemplateError;
use crate::utils::helpers::render_template;

/// Accumulated validated inputs of one scenario run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationContext {
    data: BTreeMap<String, String>,
}

impl ConversationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }

    /// Get a field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Get all field names
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Render a step template against this context
    pub fn render(&self, template: &str) -> Result<String, TemplateError> {
        render_template(template, &self.data)
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.data
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConversationContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
