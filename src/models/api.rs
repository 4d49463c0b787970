use serde::{ Serialize, Deserialize };

#[derive(Deserialize, Debug, Default)]
pub struct NewProjectRequest {
    pub name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse {
    pub project_id: String,
    pub reply: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProjectResponse {
    pub project_id: String,
    pub message_count: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DocumentResponse {
    pub filename: String,
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}
