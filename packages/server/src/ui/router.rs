//! Route table.

use std::{path::Path, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::{
    handler::{
        get_clients, get_relays, health_check, post_relays, upload_firmware, websocket_handler,
    },
    state::AppState,
};

/// Build the gateway router.
///
/// When `assets_dir` is given, unmatched paths are served from it, with
/// `index.html` for directories.
pub fn create_router(state: Arc<AppState>, assets_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/clients", get(get_clients))
        .route("/api/relays", get(get_relays).post(post_relays))
        .route("/api/ota", post(upload_firmware));

    let router = match assets_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
