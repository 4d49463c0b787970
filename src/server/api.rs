use crate::brd::BrdForm;
use crate::models::api::{
    ChatRequest,
    ChatResponse,
    DocumentResponse,
    ErrorResponse,
    NewProjectRequest,
    ProjectResponse,
};
use crate::models::chat::Conversation;
use crate::session::{ Session, SessionError };
use crate::store::StoreError;
use std::io;
use std::sync::Arc;
use tokio::sync::{ Mutex, MutexGuard };
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ State, Path },
    response::{ IntoResponse, Response },
    http::{ header, StatusCode },
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ warn, error };

#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<Session>>,
}

pub enum ApiError {
    /// Another request currently holds the session.
    Busy,
    Session(SessionError),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Session(err)
    }
}

fn status_for(err: &SessionError) -> StatusCode {
    match err {
        SessionError::NoActiveProject => StatusCode::CONFLICT,
        SessionError::UnknownProject(_) => StatusCode::NOT_FOUND,
        SessionError::ChatUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        SessionError::Provider(_) => StatusCode::BAD_GATEWAY,
        SessionError::Store(StoreError::InvalidName(_) | StoreError::InvalidRole(_)) => {
            StatusCode::BAD_REQUEST
        }
        SessionError::Store(StoreError::ProjectNotFound(_)) => StatusCode::NOT_FOUND,
        SessionError::Store(StoreError::Io { source, .. }) if
            source.kind() == io::ErrorKind::NotFound
        => StatusCode::NOT_FOUND,
        SessionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::Busy => {
                warn!("Request refused: session busy");
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ErrorResponse::new("Session busy")),
                ).into_response();
            }
            ApiError::Session(err) => err,
        };
        let code = status_for(&err);
        if code.is_server_error() {
            error!("Request failed: {}", err);
        } else {
            warn!("Request rejected: {}", err);
        }
        (code, Json(ErrorResponse::new(err.to_string()))).into_response()
    }
}

/// One action at a time: a request arriving while another holds the session
/// is refused instead of queued.
fn acquire(state: &AppState) -> Result<MutexGuard<'_, Session>, ApiError> {
    state.session.try_lock().map_err(|_| ApiError::Busy)
}

pub fn router(session: Arc<Mutex<Session>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/projects", get(list_projects_handler).post(new_project_handler))
        .route("/api/projects/{project_id}/select", post(select_project_handler))
        .route("/api/history", get(history_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/brd", post(brd_handler))
        .route("/api/documents", get(list_documents_handler))
        .route("/api/documents/{filename}", get(download_document_handler))
        .layer(cors)
        .with_state(AppState { session })
}

async fn list_projects_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let session = acquire(&state)?;
    let projects = session.list_projects()?;
    Ok(Json(projects).into_response())
}

async fn new_project_handler(
    State(state): State<AppState>,
    Json(req): Json<NewProjectRequest>
) -> Result<Response, ApiError> {
    let mut session = acquire(&state)?;
    let project_id = session.new_project(req.name.as_deref())?;
    Ok(
        (
            StatusCode::CREATED,
            Json(ProjectResponse { project_id, message_count: session.history().len() }),
        ).into_response()
    )
}

async fn select_project_handler(
    State(state): State<AppState>,
    Path(project): Path<String>
) -> Result<Response, ApiError> {
    let mut session = acquire(&state)?;
    session.select_project(&project)?;
    Ok(
        Json(ProjectResponse {
            project_id: session.project_id().unwrap_or_default().to_string(),
            message_count: session.history().len(),
        }).into_response()
    )
}

async fn history_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let session = acquire(&state)?;
    let project_id = session.project_id().ok_or(SessionError::NoActiveProject)?;
    Ok(
        Json(Conversation {
            id: project_id.to_string(),
            messages: session.history().to_vec(),
        }).into_response()
    )
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>
) -> Result<Response, ApiError> {
    let mut session = acquire(&state)?;
    let reply = session.send_message(&req.message).await?;
    Ok(
        Json(ChatResponse {
            project_id: session.project_id().unwrap_or_default().to_string(),
            reply,
        }).into_response()
    )
}

async fn brd_handler(
    State(state): State<AppState>,
    Json(form): Json<BrdForm>
) -> Result<Response, ApiError> {
    let mut session = acquire(&state)?;
    let doc = session.generate_document(&form)?;
    Ok(
        (
            StatusCode::CREATED,
            Json(DocumentResponse { filename: doc.filename, content: doc.content }),
        ).into_response()
    )
}

async fn list_documents_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let session = acquire(&state)?;
    let documents = session.list_documents()?;
    Ok(Json(documents).into_response())
}

async fn download_document_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>
) -> Result<Response, ApiError> {
    let session = acquire(&state)?;
    let content = session.read_document(&filename)?;
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));
    Ok(
        (
            [
                (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            content,
        ).into_response()
    )
}
