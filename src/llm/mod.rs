pub mod chat;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    Ollama,
    OpenAI,
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmType::Ollama => write!(f, "ollama"),
            LlmType::OpenAI => write!(f, "openai"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseLlmTypeError {
    message: String,
}

impl fmt::Display for ParseLlmTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseLlmTypeError {}
impl FromStr for LlmType {
    type Err = ParseLlmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmType::Ollama),
            "openai" => Ok(LlmType::OpenAI),
            _ =>
                Err(ParseLlmTypeError {
                    message: format!("Unsupported LLM type: '{}'", s),
                }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::OpenAI,
            api_key: None,
            completion_model: None,
            base_url: None,
        }
    }
}

pub fn parse_llm_type(type_str: &str) -> Result<LlmType, String> {
    type_str.parse::<LlmType>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types_case_insensitively() {
        assert_eq!(parse_llm_type("OpenAI"), Ok(LlmType::OpenAI));
        assert_eq!(parse_llm_type(" ollama "), Ok(LlmType::Ollama));
        assert!(parse_llm_type("qdrant").is_err());
    }
}
