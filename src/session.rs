use chrono::{ Local, NaiveDateTime };
use log::{ info, error };
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

use crate::brd::{ self, BrdForm };
use crate::config::prompt::build_chat_messages;
use crate::llm::chat::ChatClient;
use crate::models::chat::{ ChatMessage, Role };
use crate::store::{ normalize_project_id, ProjectStore, StoreError };

pub const DEFAULT_PROJECT_BASE: &str = "Project";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
const PROJECT_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("model provider request failed: {0}")]
    Provider(#[source] Box<dyn StdError + Send + Sync>),
    #[error("no chat provider is configured")]
    ChatUnavailable,
    #[error("no project is selected")]
    NoActiveProject,
    #[error("project '{0}' does not exist")]
    UnknownProject(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unselected,
    Active {
        project_id: String,
        history: Vec<ChatMessage>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub filename: String,
    pub content: String,
}

/// Process-local view of the current project. Every mutation is written to
/// the store before the call returns.
pub struct Session {
    store: ProjectStore,
    chat_client: Option<Arc<dyn ChatClient>>,
    temperature: f32,
    default_kpis: Vec<String>,
    state: SessionState,
}

impl Session {
    pub fn new(store: ProjectStore) -> Self {
        Self {
            store,
            chat_client: None,
            temperature: DEFAULT_TEMPERATURE,
            default_kpis: Vec::new(),
            state: SessionState::Unselected,
        }
    }

    pub fn with_chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.chat_client = Some(client);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_default_kpis(mut self, default_kpis: Vec<String>) -> Self {
        self.default_kpis = default_kpis;
        self
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn project_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active { project_id, .. } => Some(project_id),
            SessionState::Unselected => None,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        match &self.state {
            SessionState::Active { history, .. } => history,
            SessionState::Unselected => &[],
        }
    }

    /// Creates `<base>_<YYYY-MM-DD_HH-MM>` and makes it the active project.
    pub fn new_project(&mut self, base_name: Option<&str>) -> Result<String, SessionError> {
        self.new_project_at(base_name, Local::now().naive_local())
    }

    /// A name already taken in the same minute gets a `_2`, `_3`, ... suffix,
    /// so a new project always starts with an empty log.
    pub fn new_project_at(
        &mut self,
        base_name: Option<&str>,
        at: NaiveDateTime
    ) -> Result<String, SessionError> {
        let base = base_name
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_PROJECT_BASE);
        let stamped = format!("{}_{}", base, at.format(PROJECT_STAMP_FORMAT));
        let mut name = stamped.clone();
        let mut suffix = 2;
        while self.store.project_exists(&normalize_project_id(&name)) {
            name = format!("{}_{}", stamped, suffix);
            suffix += 1;
        }

        let project_id = self.store.create(&name)?;
        let history = self.store.load_messages(&project_id)?;
        info!("Started project '{}'", project_id);
        self.state = SessionState::Active { project_id: project_id.clone(), history };
        Ok(project_id)
    }

    /// Accepts either the identifier or the display name it was derived from,
    /// and replaces the in-memory log with the persisted one.
    pub fn select_project(&mut self, project: &str) -> Result<(), SessionError> {
        let project_id = normalize_project_id(project);
        if !self.store.project_exists(&project_id) {
            return Err(SessionError::UnknownProject(project.to_string()));
        }
        let history = self.store.load_messages(&project_id)?;
        info!("Selected project '{}' ({} messages)", project_id, history.len());
        self.state = SessionState::Active { project_id, history };
        Ok(())
    }

    fn append(&mut self, role: Role, content: &str) -> Result<(), SessionError> {
        let SessionState::Active { project_id, history } = &mut self.state else {
            return Err(SessionError::NoActiveProject);
        };
        self.store.append_message(project_id, role, content)?;
        history.push(ChatMessage::new(role, content));
        Ok(())
    }

    /// One chat turn. The user message is persisted before the provider is
    /// called, so it survives a provider failure.
    pub async fn send_message(&mut self, content: &str) -> Result<String, SessionError> {
        let client = self.chat_client.clone().ok_or(SessionError::ChatUnavailable)?;
        self.append(Role::User, content)?;

        let messages = build_chat_messages(self.history());
        let reply = match client.complete(&messages, self.temperature).await {
            Ok(resp) => resp.response,
            Err(e) => {
                error!("Chat completion failed: {}", e);
                return Err(SessionError::Provider(e));
            }
        };

        self.append(Role::Assistant, &reply)?;
        Ok(reply)
    }

    /// Renders the form and saves it; the file is also recorded on the active
    /// project when there is one.
    pub fn generate_document(&mut self, form: &BrdForm) -> Result<GeneratedDocument, SessionError> {
        let answers = form.to_answers(&self.default_kpis);
        let content = brd::render(&answers);
        let filename = self.store.write_document(form.title(), &content)?;
        if let Some(project_id) = self.project_id() {
            self.store.record_document(project_id, &filename)?;
        }
        Ok(GeneratedDocument { filename, content })
    }

    pub fn list_projects(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.store.list_projects()?)
    }

    pub fn list_documents(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.store.list_documents()?)
    }

    pub fn read_document(&self, filename: &str) -> Result<String, SessionError> {
        Ok(self.store.read_document(filename)?)
    }

    pub fn export_transcript(&self) -> Result<String, SessionError> {
        let project_id = self.project_id().ok_or(SessionError::NoActiveProject)?;
        Ok(self.store.export_transcript(project_id)?)
    }
}
