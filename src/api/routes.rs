//! API Routes
//!
//! Configures the Axum router with the file and diagnostic endpoints.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{entries_handler, file_handler, health_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Serve index.html
/// - `GET /*path` - Serve a resource from the server root
/// - `GET /_cache/stats` - Cache statistics
/// - `GET /_cache/entries` - Cache listing, most recently used first
/// - `GET /_health` - Health check endpoint
///
/// The diagnostic paths are reserved: a file named `_health` or stored under
/// `_cache/` in the server root is never served.
///
/// # Middleware
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/_health", get(health_handler))
        .route("/_cache/stats", get(stats_handler))
        .route("/_cache/entries", get(entries_handler))
        .route("/", get(file_handler))
        .route("/*path", get(file_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
