use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use std::error::Error as StdError;
use super::{ ChatClient, CompletionResponse };
use crate::llm::{ LlmConfig, LlmType };
use crate::models::chat::ChatMessage;
use log::debug;

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>) -> Self {
        let model = completion_model.unwrap_or_else(|| "llama3".to_string());
        let url = base_url.unwrap_or_else(|| "http://localhost:11434".into());

        Self {
            http: HttpClient::new(),
            base_url: url,
            completion_model: model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != LlmType::Ollama {
            return Err("Invalid config type for OllamaClient".into());
        }

        Ok(Self::new(config.base_url.clone(), config.completion_model.clone()))
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let req = ChatRequest {
            model: &self.completion_model,
            messages,
            stream: false,
            options: ChatOptions { temperature },
        };
        debug!("Ollama chat request: model={}, messages={}", self.completion_model, messages.len());
        let resp = self.http
            .post(&url)
            .json(&req)
            .send().await?
            .error_for_status()?
            .json::<ChatResponse>().await?;
        Ok(CompletionResponse { response: resp.message.content })
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
