//! REST API endpoint handlers.
//!
//! Every mutation of the conversation goes through the [`SharedHistory`]
//! lock, which `post_ask*` hold for the whole submission: uploads are
//! encoded, the agent is called, and the turn is appended before the next
//! request can touch the history.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use gaia_chat::examples::{EXAMPLE_GROUPS, ExampleGroup};
use gaia_chat::files::SUPPORTED_EXTENSIONS;
use gaia_chat::history::History;
use gaia_chat::session::ChatSession;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::SharedHistory;

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<ChatSession>,
    pub history: SharedHistory,
    pub upload_dir: PathBuf,
    upload_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(session: Arc<ChatSession>, history: SharedHistory, upload_dir: PathBuf) -> Self {
        Self {
            session,
            history,
            upload_dir,
            upload_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fresh directory for one submission's uploads.
    fn next_upload_dir(&self) -> PathBuf {
        let seq = self.upload_seq.fetch_add(1, Ordering::Relaxed);
        self.upload_dir
            .join(format!("submission-{}-{seq}", std::process::id()))
    }

    /// Run one submission against the shared history.
    ///
    /// The stored history is only replaced once the submission completes, so
    /// a dropped request leaves earlier turns intact.
    async fn submit(&self, question: &str, files: &[PathBuf]) -> AskResponse {
        let mut guard = self.history.lock().await;
        let (question, history) = self
            .session
            .process(question, guard.clone(), files)
            .await;
        *guard = history;
        AskResponse {
            question,
            history: guard.clone(),
        }
    }

    /// Resolve client-supplied paths, accepting only files inside the upload
    /// directory.
    async fn confine_to_uploads(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>, StatusCode> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let root = tokio::fs::canonicalize(&self.upload_dir).await.map_err(|e| {
            warn!("Upload dir {} unavailable: {e}", self.upload_dir.display());
            StatusCode::FORBIDDEN
        })?;

        let mut resolved = Vec::with_capacity(files.len());
        for file in files {
            match tokio::fs::canonicalize(file).await {
                Ok(path) if path.starts_with(&root) => resolved.push(path),
                _ => {
                    warn!("Rejected file outside upload dir: {}", file.display());
                    return Err(StatusCode::FORBIDDEN);
                }
            }
        }
        Ok(resolved)
    }
}

/// A submission's upload directory, removed when dropped.
struct UploadDir(PathBuf);

impl Drop for UploadDir {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.0) {
            Ok(()) => debug!("Removed upload dir {}", self.0.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove upload dir {}: {e}", self.0.display()),
        }
    }
}

/// Response body for both ask endpoints: the cleared input and the
/// updated conversation.
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub history: History,
}

/// GET /api/history — Current conversation.
pub async fn get_history(State(app): State<AppState>) -> Json<History> {
    Json(app.history.lock().await.clone())
}

/// POST /api/ask — Submit a question with uploads.
///
/// Multipart fields: `question` (text, optional) and any number of `files`.
/// Uploads are stored under a per-submission directory that is removed when
/// the handler finishes, on success, error, or cancellation. Returns 400 for
/// a malformed form, 500 if an upload cannot be stored.
pub async fn post_ask(
    State(app): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AskResponse>, StatusCode> {
    let dir = UploadDir(app.next_upload_dir());
    let mut question = String::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed multipart request: {e}");
        StatusCode::BAD_REQUEST
    })? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("question") => {
                question = field.text().await.map_err(|e| {
                    warn!("Failed to read question field: {e}");
                    StatusCode::BAD_REQUEST
                })?;
            }
            Some("files") => {
                let name = safe_file_name(field.file_name().unwrap_or("upload"));
                let data = field.bytes().await.map_err(|e| {
                    warn!("Failed to read upload field: {e}");
                    StatusCode::BAD_REQUEST
                })?;
                let path = store_upload(&dir.0, &name, &data).await.map_err(|e| {
                    warn!("{e}");
                    StatusCode::INTERNAL_SERVER_ERROR
                })?;
                files.push(path);
            }
            other => debug!("Ignoring unknown multipart field {other:?}"),
        }
    }

    Ok(Json(app.submit(&question, &files).await))
}

/// Request body for POST /api/ask/json.
#[derive(Debug, Deserialize, Serialize)]
pub struct AskJsonRequest {
    #[serde(default)]
    pub question: String,
    /// Paths of files already placed inside the server's upload directory.
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

/// POST /api/ask/json — Submit a question referencing server-side files.
///
/// Returns 403 if any path does not resolve to a file inside the upload
/// directory.
pub async fn post_ask_json(
    State(app): State<AppState>,
    Json(body): Json<AskJsonRequest>,
) -> Result<Json<AskResponse>, StatusCode> {
    let files = app.confine_to_uploads(&body.files).await?;
    Ok(Json(app.submit(&body.question, &files).await))
}

/// POST /api/clear — Empty the conversation. Returns `[]`.
pub async fn post_clear(State(app): State<AppState>) -> Json<History> {
    let mut guard = app.history.lock().await;
    *guard = app.session.clear_history();
    Json(guard.clone())
}

/// Response body for POST /api/export.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportResponse {
    pub path: PathBuf,
}

/// POST /api/export — Write the conversation as Markdown.
///
/// Returns the path of the generated file, or 500 if it cannot be written.
pub async fn post_export(
    State(app): State<AppState>,
) -> Result<Json<ExportResponse>, StatusCode> {
    let history = app.history.lock().await.clone();
    app.session
        .export(&history)
        .map(|path| Json(ExportResponse { path }))
        .map_err(|e| {
            warn!("Export failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

/// Response body for GET /api/info.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub title: &'static str,
    pub supported_extensions: &'static [&'static str],
    pub examples: &'static [ExampleGroup],
}

/// GET /api/info — Static UI metadata.
pub async fn get_info() -> Json<InfoResponse> {
    Json(InfoResponse {
        title: gaia_chat::APP_TITLE,
        supported_extensions: SUPPORTED_EXTENSIONS,
        examples: EXAMPLE_GROUPS,
    })
}

/// Strip any directory components from a client-supplied file name.
fn safe_file_name(raw: &str) -> String {
    // Browsers on Windows may send backslash-separated paths.
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    match last {
        "" | "." | ".." => "upload".to_string(),
        name => name.to_string(),
    }
}

/// Write one upload into `dir`, suffixing the name on collision.
async fn store_upload(dir: &Path, name: &str, data: &[u8]) -> Result<PathBuf, String> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| format!("failed to create upload dir {}: {e}", dir.display()))?;

    let mut target = dir.join(name);
    let mut n = 1;
    while tokio::fs::try_exists(&target).await.unwrap_or(false) {
        target = dir.join(format!("{n}-{name}"));
        n += 1;
    }

    tokio::fs::write(&target, data)
        .await
        .map_err(|e| format!("failed to store upload {}: {e}", target.display()))?;
    debug!("Stored upload {} ({} bytes)", target.display(), data.len());
    Ok(target)
}
