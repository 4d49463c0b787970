//! Flat-file project store.
//!
//! Every project is a directory under the store root holding `metadata.json`
//! and `chat_history.json`. Generated documents and transcript snapshots sit
//! directly in the root. Each mutation rewrites the whole file it touches;
//! there is no locking between processes.

mod document;
mod project;

use serde::{ Deserialize, Serialize };
use std::io;
use std::path::{ Path, PathBuf };
use thiserror::Error;

pub const METADATA_FILE: &str = "metadata.json";
pub const CHAT_HISTORY_FILE: &str = "chat_history.json";
pub const OUTPUTS_DIR: &str = "outputs";
pub const DOCUMENT_EXTENSION: &str = "md";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store IO error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed store file '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid name '{0}'")]
    InvalidName(String),
    #[error("role '{0}' cannot be stored in a message log")]
    InvalidRole(String),
    #[error("project '{0}' not found")]
    ProjectNotFound(String),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io { path: path.to_path_buf(), source }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        StoreError::Json { path: path.to_path_buf(), source }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub project_name: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<String>,
}

/// Replaces path separators, `..` and control characters with `_` so the
/// result is usable as a single file name component.
pub(crate) fn sanitize_name_component(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_control() || c == '/' || c == '\\' { '_' } else { c })
        .collect::<String>()
        .replace("..", "_")
}

/// Turns a display name into a project identifier: whitespace becomes `_`,
/// path-like and control characters are replaced, everything is lower-cased.
/// Applying it to an identifier returns the identifier unchanged.
pub fn normalize_project_id(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    sanitize_name_component(&spaced).to_lowercase()
}

/// Rejects anything that could escape the store root.
pub(crate) fn validate_file_name(name: &str) -> Result<(), StoreError> {
    let trimmed = name.trim();
    if
        trimmed.is_empty() ||
        trimmed == "." ||
        trimmed.contains("..") ||
        trimmed.contains('/') ||
        trimmed.contains('\\')
    {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn project_dir(&self, project_id: &str) -> Result<PathBuf, StoreError> {
        validate_file_name(project_id)?;
        Ok(self.root.join(project_id))
    }
}
