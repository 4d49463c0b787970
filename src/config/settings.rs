use log::{ info, warn };
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::cli::Args;
use crate::llm::{ parse_llm_type, LlmConfig };

pub const DEFAULT_PROJECT_PATH: &str = "projects";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid chat LLM type: {0}")]
    LlmType(String),
}

/// Contents of the settings file. Every field is optional on disk.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default = "default_project_path")]
    pub default_project_path: String,
    #[serde(default)]
    pub default_kpis: Vec<String>,
}

fn default_project_path() -> String {
    DEFAULT_PROJECT_PATH.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            default_project_path: default_project_path(),
            default_kpis: Vec::new(),
        }
    }
}

/// Reads the settings file. A missing file yields defaults.
pub fn load_settings(path: &str) -> Result<Settings, ConfigError> {
    let file_content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Settings file '{}' not found, using defaults", path);
            return Ok(Settings::default());
        }
        Err(e) => {
            return Err(ConfigError::Io { path: path.to_string(), source: e });
        }
    };
    serde_json::from_str(&file_content).map_err(|e| ConfigError::Json {
        path: path.to_string(),
        source: e,
    })
}

/// Settings merged with command-line and environment overrides.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub project_dir: PathBuf,
    pub default_kpis: Vec<String>,
    pub temperature: f32,
    pub llm: LlmConfig,
}

impl AppConfig {
    pub fn from_parts(args: &Args, settings: Settings) -> Result<Self, ConfigError> {
        let llm_type = parse_llm_type(&args.chat_llm_type).map_err(ConfigError::LlmType)?;
        let api_key = Some(args.chat_api_key.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| Some(settings.openai_api_key.clone()).filter(|k| !k.trim().is_empty()));
        let project_dir = args.project_dir
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(settings.default_project_path);

        Ok(Self {
            project_dir: PathBuf::from(project_dir),
            default_kpis: settings.default_kpis,
            temperature: args.temperature,
            llm: LlmConfig {
                llm_type,
                api_key,
                completion_model: args.chat_model.clone(),
                base_url: args.chat_base_url.clone(),
            },
        })
    }
}

pub fn initialize_app_config(args: &Args) -> Result<AppConfig, ConfigError> {
    info!("Loading settings from: {}", args.settings);
    let settings = load_settings(&args.settings)?;
    AppConfig::from_parts(args, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["analyst-assistant"];
        argv.extend_from_slice(extra);
        argv.push("projects");
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let settings = load_settings(path.to_str().unwrap()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn reads_all_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"openai_api_key":"sk-test","default_project_path":"data","default_kpis":["Revenue","Churn"]}}"#
        ).unwrap();
        let settings = load_settings(file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.openai_api_key, "sk-test");
        assert_eq!(settings.default_project_path, "data");
        assert_eq!(settings.default_kpis, vec!["Revenue", "Churn"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = load_settings(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn command_line_overrides_settings() {
        let settings = Settings {
            openai_api_key: "from-file".into(),
            default_project_path: "from-file".into(),
            default_kpis: vec!["Revenue".into()],
        };
        let config = AppConfig::from_parts(
            &args(&["--chat-api-key", "from-flag", "--project-dir", "elsewhere"]),
            settings.clone()
        ).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("from-flag"));
        assert_eq!(config.project_dir, PathBuf::from("elsewhere"));

        let config = AppConfig::from_parts(&args(&[]), settings).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.project_dir, PathBuf::from("from-file"));
        assert_eq!(config.default_kpis, vec!["Revenue"]);
    }
}
