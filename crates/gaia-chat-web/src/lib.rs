//! Browser-based Q&A chat UI for gaia-chat agents.
//!
//! `gaia-chat-web` wraps a [`ChatSession`] in an axum server: the browser
//! submits a question and uploads via a multipart form, the server runs the
//! submission pipeline, and responds with the updated conversation. A small
//! embedded page is served at `/`; point [`WebConfig::static_dir`] at a
//! separately built frontend to replace it.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use gaia_chat::prelude::*;
//! use gaia_chat_web::{WebConfig, spawn_web};
//!
//! let agent = FnAgent::answering(|q| Ok(format!("You asked: {q}")));
//! let session = Arc::new(ChatSession::new(Arc::new(agent), "exports"));
//!
//! let (addr, _history) = spawn_web(session, WebConfig::default()).await?;
//! println!("Web UI: http://{addr}");
//! ```
//!
//! # Endpoints
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /api/history` | Current turns |
//! | `POST /api/ask` | Multipart: `question` + repeated `files` |
//! | `POST /api/ask/json` | `{"question", "files": [paths inside the upload dir]}` |
//! | `POST /api/clear` | Empty the history |
//! | `POST /api/export` | Write a Markdown transcript, return its path |
//! | `GET /api/info` | Title, accepted extensions, example questions |

mod api;
mod server;

pub use api::{AskJsonRequest, AskResponse, ExportResponse, InfoResponse};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use gaia_chat::history::History;
use gaia_chat::session::ChatSession;
use tokio::sync::Mutex;

/// Conversation shared by all requests. Held for the whole of a submission,
/// so submissions never overlap.
pub type SharedHistory = Arc<Mutex<History>>;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:7860`.
    pub bind_addr: SocketAddr,
    /// Directory with a static frontend build. If `None`, the embedded page
    /// is served at `/`.
    pub static_dir: Option<PathBuf>,
    /// Where uploads are stored while a submission is processed.
    /// Default: `<temp dir>/gaia-chat-uploads`.
    pub upload_dir: PathBuf,
    /// Maximum request body size for uploads. Default: 50 MiB.
    pub max_upload_bytes: usize,
    /// Origins allowed to call the API cross-origin, e.g.
    /// `http://localhost:5173` for a frontend dev server. Default: none.
    pub allowed_origins: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7860)),
            static_dir: None,
            upload_dir: std::env::temp_dir().join("gaia-chat-uploads"),
            max_upload_bytes: 50 * 1024 * 1024,
            allowed_origins: Vec::new(),
        }
    }
}

/// Spawn the web server on a Tokio task.
///
/// Creates the upload directory, then returns the bound address and the
/// shared conversation history. The server runs until the Tokio runtime
/// shuts down.
pub async fn spawn_web(
    session: Arc<ChatSession>,
    config: WebConfig,
) -> std::io::Result<(SocketAddr, SharedHistory)> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let history: SharedHistory = Arc::new(Mutex::new(History::new()));
    let state = api::AppState::new(session, history.clone(), config.upload_dir);
    let router = server::build_router(
        state,
        config.static_dir,
        config.max_upload_bytes,
        &config.allowed_origins,
    );
    let addr = server::start_server(router, config.bind_addr).await?;
    Ok((addr, history))
}
