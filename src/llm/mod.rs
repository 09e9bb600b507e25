//! Language model clients
//!
//! The pipeline only needs one capability from a model: turn a prompt into a
//! completion. Two transports implement it:
//! - `OpenAiChatClient`: any OpenAI-compatible `/chat/completions` endpoint
//! - `OllamaClient`: a local Ollama server via `/api/generate`

pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{LlmConfig, LlmProvider};
use crate::errors::{RagError, Result};

pub use ollama::OllamaClient;
pub use openai::OpenAiChatClient;

/// Prompt in, completion text out
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a prompt and return the raw completion text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logs and the banner
    fn model(&self) -> &str;

    /// Reachability check used by `doctor`
    async fn health_check(&self) -> bool {
        true
    }
}

/// Build the client selected in the configuration
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
    match config.provider {
        LlmProvider::OpenAi => {
            let api_key = config.api_key().ok_or_else(|| {
                RagError::Setup(format!(
                    "API key not found: set {} in the environment or .env",
                    config.api_key_env
                ))
            })?;
            let client = OpenAiChatClient::new(config, api_key)?;
            tracing::debug!(base_url = client.base_url(), model = client.model(), "using chat completions");
            Ok(Arc::new(client))
        }
        LlmProvider::Ollama => {
            let client = OllamaClient::with_config(&config.base_url, &config.model)?;
            tracing::debug!(base_url = client.base_url(), model = client.model(), "using ollama");
            Ok(Arc::new(client))
        }
    }
}
