//! Client construction for the OpenAI-compatible model endpoint.

use crate::config::LlmSettings;
use async_openai::{config::OpenAIConfig, Client};
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;

/// Create a client for the configured endpoint and API key.
///
/// Rate-limited responses are not retried: a zero elapsed-time budget makes
/// the first 429 final. No request timeout is set beyond the transport default.
pub fn create_client(settings: &LlmSettings) -> Client<OpenAIConfig> {
    let mut config = OpenAIConfig::new().with_api_base(&settings.api_base);
    if let Some(key) = &settings.api_key {
        config = config.with_api_key(key);
    }

    let no_retry = ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build();

    Client::with_config(config)
        .with_http_client(reqwest::Client::new())
        .with_backoff(no_retry)
}
