//! Language model abstraction for Recap.
//!
//! A single operation: send a prompt to a named model and get text back.
//! Every failure is normalized into [`GenerationError`].

mod chat_completion;

pub use chat_completion::ChatCompletionModel;

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a generation call (network, auth, quota, malformed response).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error with AI generation: {reason}")]
pub struct GenerationError {
    pub reason: String,
}

impl GenerationError {
    pub fn new(reason: impl std::fmt::Display) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

/// Trait for text generation backends.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate text for `prompt` with the named model.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;

    /// List the model ids available to the configured credentials.
    async fn list_models(&self) -> Result<Vec<String>, GenerationError>;
}
