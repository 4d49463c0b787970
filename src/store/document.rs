use chrono::{ Local, NaiveDateTime };
use log::{ info, warn };
use std::fs;
use std::io;

use super::project::write_json;
use super::{
    sanitize_name_component,
    validate_file_name,
    ProjectStore,
    StoreError,
    DOCUMENT_EXTENSION,
};

pub const DEFAULT_DOCUMENT_BASE: &str = "BRD";
const DOCUMENT_STAMP_FORMAT: &str = "%Y%m%d_%H%M";
const SNAPSHOT_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

fn file_base(base_name: Option<&str>, fallback: &str) -> String {
    match base_name.map(str::trim).filter(|b| !b.is_empty()) {
        Some(base) => sanitize_name_component(base),
        None => fallback.to_string(),
    }
}

pub fn document_file_name(base_name: Option<&str>, at: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        file_base(base_name, DEFAULT_DOCUMENT_BASE),
        at.format(DOCUMENT_STAMP_FORMAT),
        DOCUMENT_EXTENSION
    )
}

impl ProjectStore {
    pub fn write_document(
        &self,
        base_name: Option<&str>,
        content: &str
    ) -> Result<String, StoreError> {
        self.write_document_at(base_name, content, Local::now().naive_local())
    }

    /// Names have minute resolution: a second document for the same base in
    /// the same minute replaces the first.
    pub fn write_document_at(
        &self,
        base_name: Option<&str>,
        content: &str,
        at: NaiveDateTime
    ) -> Result<String, StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        let filename = document_file_name(base_name, at);
        let path = self.root.join(&filename);
        if path.exists() {
            warn!("Overwriting existing document {}", filename);
        }
        fs::write(&path, content).map_err(|e| StoreError::io(&path, e))?;
        info!("Saved document {}", filename);
        Ok(filename)
    }

    pub fn list_documents(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StoreError::io(&self.root, e));
            }
        };

        let mut documents = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            let path = entry.path();
            let is_document = path.is_file() &&
                path.extension().and_then(|ext| ext.to_str()) == Some(DOCUMENT_EXTENSION);
            if is_document {
                if let Some(name) = entry.file_name().to_str() {
                    documents.push(name.to_string());
                }
            }
        }
        documents.sort();
        Ok(documents)
    }

    pub fn read_document(&self, filename: &str) -> Result<String, StoreError> {
        validate_file_name(filename)?;
        let path = self.root.join(filename);
        fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))
    }

    /// Writes the project's message log to `<project>_<YYYY-MM-DD_HH-MM>.json`
    /// in the store root.
    pub fn export_transcript(&self, project_id: &str) -> Result<String, StoreError> {
        if !self.project_exists(project_id) {
            return Err(StoreError::ProjectNotFound(project_id.to_string()));
        }
        let history = self.load_messages(project_id)?;
        let filename = format!(
            "{}_{}.json",
            file_base(Some(project_id), "Project"),
            Local::now().format(SNAPSHOT_STAMP_FORMAT)
        );
        let path = self.root.join(&filename);
        write_json(&path, &history)?;
        info!("Exported {} messages from '{}' to {}", history.len(), project_id, filename);
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn file_name_uses_base_or_default() {
        assert_eq!(document_file_name(Some("Sales KPI"), at(9, 7, 0)), "Sales KPI_20240305_0907.md");
        assert_eq!(document_file_name(None, at(23, 59, 59)), "BRD_20240305_2359.md");
        assert_eq!(document_file_name(Some("   "), at(0, 0, 0)), "BRD_20240305_0000.md");
    }

    #[test]
    fn file_name_strips_path_separators() {
        assert_eq!(document_file_name(Some("a/b"), at(1, 2, 3)), "a_b_20240305_0102.md");
    }

    #[test]
    fn file_name_replaces_control_characters() {
        let name = document_file_name(Some("Q3\nplan"), at(1, 2, 3));
        assert_eq!(name, "Q3_plan_20240305_0102.md");
        assert!(!name.chars().any(char::is_control));
    }
}
