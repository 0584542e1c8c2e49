//! Artifact actions
//!
//! An artifact action runs when a step is entered and produces a binary
//! attachment (such as a rendered ticket) that is sent to the user after
//! the step's text.

use async_trait::async_trait;

use crate::state::context::ConversationContext;
use crate::utils::errors::Result;

/// Binary attachment produced by an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn png(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: "image/png".to_string(),
            bytes,
        }
    }
}

/// Side-effect action of a step
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    /// Build the artifact from the inbound text and the accumulated context
    async fn generate(&self, text: &str, context: &ConversationContext) -> Result<Artifact>;
}

impl std::fmt::Debug for dyn ArtifactGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<dyn ArtifactGenerator>")
    }
}
