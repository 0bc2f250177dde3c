//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::response::Html;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, warn};

use crate::api::{self, AppState};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Build the full axum router.
///
/// The router serves:
/// - REST API at `/api/*`
/// - The embedded chat page at `/`, or static files from `static_dir`
///
/// Cross-origin requests are only allowed from `allowed_origins`; with an
/// empty list no CORS headers are sent at all.
pub fn build_router(
    state: AppState,
    static_dir: Option<PathBuf>,
    max_upload_bytes: usize,
    allowed_origins: &[String],
) -> Router {

    let api_routes = Router::new()
        .route("/api/history", get(api::get_history))
        .route("/api/ask", post(api::post_ask))
        .route("/api/ask/json", post(api::post_ask_json))
        .route("/api/clear", post(api::post_clear))
        .route("/api/export", post(api::post_export))
        .route("/api/info", get(api::get_info))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);

    let mut router = Router::new().merge(api_routes);
    if let Some(cors) = cors_layer(allowed_origins) {
        router = router.layer(cors);
    }

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.route("/", get(|| async { Html(INDEX_HTML) })),
    }
}

/// CORS for frontends served from a different origin.
fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin:?}: {e}");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

/// Bind the listener, start serving on a background task, and return the
/// bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("Web server stopped: {e}");
        }
    });

    Ok(addr)
}
