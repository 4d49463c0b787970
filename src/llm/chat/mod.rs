pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error as StdError;
use std::sync::Arc;
use super::{ LlmConfig, LlmType };
use self::ollama::OllamaClient;
use self::openai::OpenAIChatClient;
use crate::models::chat::ChatMessage;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub response: String,
}

/// A chat-completion backend. One request, one reply; no streaming, no retries.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_requires_api_key() {
        let config = LlmConfig { llm_type: LlmType::OpenAI, ..Default::default() };
        assert!(new_client(&config).is_err());
    }

    #[test]
    fn ollama_uses_adapter_defaults() {
        let config = LlmConfig { llm_type: LlmType::Ollama, ..Default::default() };
        let client = new_client(&config).unwrap();
        assert_eq!(client.get_base_url().as_deref(), Some("http://localhost:11434"));
    }
}
