use chrono::Local;
use log::{ debug, info };
use std::fs;
use std::io;
use std::path::Path;

use super::{
    normalize_project_id,
    ProjectMetadata,
    ProjectStore,
    StoreError,
    CHAT_HISTORY_FILE,
    METADATA_FILE,
    OUTPUTS_DIR,
};
use crate::models::chat::{ ChatMessage, Role };

pub(crate) const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

impl ProjectStore {
    /// Creates the project directory if needed and returns its identifier.
    /// Calling it again for the same name leaves existing data untouched.
    pub fn create(&self, name: &str) -> Result<String, StoreError> {
        let project_id = normalize_project_id(name);
        let project_dir = self.project_dir(&project_id)?;
        let outputs_dir = project_dir.join(OUTPUTS_DIR);
        fs::create_dir_all(&outputs_dir).map_err(|e| StoreError::io(&outputs_dir, e))?;

        let metadata_path = project_dir.join(METADATA_FILE);
        if !metadata_path.exists() {
            let metadata = ProjectMetadata {
                project_name: name.to_string(),
                created_at: Local::now().format(CREATED_AT_FORMAT).to_string(),
                documents: Vec::new(),
            };
            write_json(&metadata_path, &metadata)?;
            info!("Created project '{}' at {}", project_id, project_dir.display());
        } else {
            debug!("Project '{}' already exists", project_id);
        }

        Ok(project_id)
    }

    pub fn project_exists(&self, project_id: &str) -> bool {
        self.project_dir(project_id)
            .map(|dir| dir.is_dir())
            .unwrap_or(false)
    }

    pub fn metadata(&self, project_id: &str) -> Result<ProjectMetadata, StoreError> {
        let path = self.project_dir(project_id)?.join(METADATA_FILE);
        read_json::<ProjectMetadata>(&path)?.ok_or_else(||
            StoreError::ProjectNotFound(project_id.to_string())
        )
    }

    pub fn append_message(
        &self,
        project_id: &str,
        role: Role,
        content: &str
    ) -> Result<(), StoreError> {
        if role == Role::System {
            return Err(StoreError::InvalidRole(role.to_string()));
        }
        let project_dir = self.project_dir(project_id)?;
        fs::create_dir_all(&project_dir).map_err(|e| StoreError::io(&project_dir, e))?;

        let path = project_dir.join(CHAT_HISTORY_FILE);
        let mut history: Vec<ChatMessage> = read_json(&path)?.unwrap_or_default();
        history.push(ChatMessage::new(role, content));
        write_json(&path, &history)?;
        debug!("Appended {} message to '{}' ({} total)", role, project_id, history.len());
        Ok(())
    }

    pub fn load_messages(&self, project_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let path = self.project_dir(project_id)?.join(CHAT_HISTORY_FILE);
        Ok(read_json(&path)?.unwrap_or_default())
    }

    pub fn list_projects(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StoreError::io(&self.root, e));
            }
        };

        let mut projects = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    projects.push(name.to_string());
                }
            }
        }
        projects.sort();
        Ok(projects)
    }

    /// Adds `filename` to the project's document set.
    pub fn record_document(&self, project_id: &str, filename: &str) -> Result<(), StoreError> {
        let path = self.project_dir(project_id)?.join(METADATA_FILE);
        let mut metadata = read_json::<ProjectMetadata>(&path)?.ok_or_else(||
            StoreError::ProjectNotFound(project_id.to_string())
        )?;
        if !metadata.documents.iter().any(|d| d == filename) {
            metadata.documents.push(filename.to_string());
            write_json(&path, &metadata)?;
        }
        Ok(())
    }
}

/// `Ok(None)` when the file does not exist.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path
) -> Result<Option<T>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(None);
        }
        Err(e) => {
            return Err(StoreError::io(path, e));
        }
    };
    serde_json
        ::from_str(&raw)
        .map(Some)
        .map_err(|e| StoreError::json(path, e))
}

pub(crate) fn write_json<T: serde::Serialize + ?Sized>(
    path: &Path,
    value: &T
) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::json(path, e))?;
    fs::write(path, json).map_err(|e| StoreError::io(path, e))
}
