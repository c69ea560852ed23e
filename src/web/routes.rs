use axum::{
    extract::{ws::WebSocketUpgrade, State},
    http::Uri,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::static_files;
use super::ws;
use crate::state::AppState;

/// Create the main application router.
///
/// Every GET path serves assets, and every path also accepts the WebSocket
/// upgrade, so the browser can open its signaling socket against the same
/// origin it loaded the page from.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(entry_handler))
        .route("/*path", get(entry_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Dispatch between the signaling upgrade and static assets
async fn entry_handler(
    upgrade: Option<WebSocketUpgrade>,
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Response {
    if let Some(upgrade) = upgrade {
        return ws::upgrade(upgrade, state.registry.clone());
    }

    let path = uri.path().trim_start_matches('/');
    match static_files::serve_path(&state.config.assets, &state.config.signaling.url, path).await
    {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}
