//! Chat-completions backed generation (Gemini via its OpenAI-compatible API).

use super::{GenerationError, LanguageModel};
use crate::config::LlmSettings;
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

/// Language model that sends one user message per prompt.
pub struct ChatCompletionModel {
    client: Client<OpenAIConfig>,
}

impl ChatCompletionModel {
    pub fn new(settings: &LlmSettings) -> Self {
        Self {
            client: create_client(settings),
        }
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionModel {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        info!("Starting generation with model {}", model);

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(GenerationError::new)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![message.into()])
            .build()
            .map_err(GenerationError::new)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("Generation failed: {}", e);
            GenerationError::new(e)
        })?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GenerationError::new("empty response from model"))?;

        debug!("Generation response received ({} chars)", text.len());
        Ok(text)
    }

    async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let response = self
            .client
            .models()
            .list()
            .await
            .map_err(GenerationError::new)?;

        Ok(response.data.into_iter().map(|m| m.id).collect())
    }
}
