pub mod repl;

use clap::{ Args as ClapArgs, Parser, Subcommand };
use crate::brd::BrdForm;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Settings Args ---
    /// Path to the JSON settings file (API key, project path, default KPIs).
    #[arg(long, env = "SETTINGS_PATH", default_value = "config/settings.json", global = true)]
    pub settings: String,

    /// Directory holding projects and generated documents. Overrides `default_project_path`.
    #[arg(long, env = "PROJECT_DIR", global = true)]
    pub project_dir: Option<String>,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (openai, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai", global = true)]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL", global = true)] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider. Overrides `openai_api_key` from the settings file.
    #[arg(long, env = "CHAT_API_KEY", default_value = "", hide_env_values = true, global = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gpt-4o, llama3)
    #[arg(long, env = "CHAT_MODEL", global = true)] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Sampling temperature sent with every chat request.
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.7", global = true)]
    pub temperature: f32,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List saved projects.
    Projects,

    /// Create a new project named `<NAME>_<YYYY-MM-DD_HH-MM>`.
    New {
        /// Base name; defaults to "Project".
        #[arg(long)]
        name: Option<String>,
    },

    /// Print the chat history of a project.
    History {
        #[arg(long)]
        project: String,
    },

    /// Chat with the assistant inside a project. Without MESSAGE, starts an interactive session.
    Chat {
        #[arg(long)]
        project: String,

        message: Option<String>,
    },

    /// Generate a Business Requirements Document from the given answers.
    Brd(BrdArgs),

    /// List generated documents.
    Documents,

    /// Print a generated document.
    Show {
        filename: String,
    },

    /// Write a JSON snapshot of a project's chat history.
    Export {
        #[arg(long)]
        project: String,
    },

    /// Serve the HTTP API.
    Serve {
        /// Host address and port for the server to listen on.
        #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
        addr: String,
    },
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct BrdArgs {
    /// Document title; also used as the file name base.
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub overview: Option<String>,

    #[arg(long)]
    pub objectives: Option<String>,

    #[arg(long)]
    pub stakeholders: Option<String>,

    /// Key KPIs; defaults to the settings file's `default_kpis`.
    #[arg(long)]
    pub kpis: Option<String>,

    #[arg(long)]
    pub success_criteria: Option<String>,

    #[arg(long)]
    pub risks: Option<String>,

    /// Attach the document to this project.
    #[arg(long)]
    pub project: Option<String>,
}

impl BrdArgs {
    pub fn to_form(&self) -> BrdForm {
        BrdForm {
            title: self.title.clone(),
            project_overview: self.overview.clone(),
            objectives: self.objectives.clone(),
            stakeholders: self.stakeholders.clone(),
            kpis: self.kpis.clone(),
            success_criteria: self.success_criteria.clone(),
            risks: self.risks.clone(),
        }
    }
}
