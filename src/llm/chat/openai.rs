use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;

use super::{ ChatClient, CompletionResponse };
use crate::llm::{ LlmConfig, LlmType };
use crate::models::chat::ChatMessage;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const CHAT_COMPLETIONS_ROUTE: &str = "/v1/chat/completions";

pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            model: chat_model,
            base_url: api_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != LlmType::OpenAI {
            return Err("Invalid config type for OpenAIChatClient".into());
        }
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| "OpenAI API key is required".to_string())?;

        Self::new(api_key, config.completion_model.clone(), config.base_url.clone())
    }

    /// Accepts either a bare host or a full `.../chat/completions` URL.
    fn completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}{}", base, CHAT_COMPLETIONS_ROUTE)
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let url = self.completions_url();
        let req = OpenAIChatRequest {
            model: &self.model,
            messages,
            temperature,
        };
        debug!("OpenAI chat request: model={}, messages={}", self.model, messages.len());

        let resp = self.http.post(&url)
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<OpenAIResponse>()
            .await?;

        let content = resp.choices.into_iter()
            .next()
            .ok_or_else(|| "No response from OpenAI API".to_string())?
            .message.content
            .unwrap_or_default();

        Ok(CompletionResponse { response: content })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
