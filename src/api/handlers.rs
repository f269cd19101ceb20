//! API Handlers
//!
//! HTTP request handlers for static resources and the diagnostic endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::cache::Cache;
use crate::config::Config;
use crate::dispatch::{Dispatcher, Resource};
use crate::error::ServerError;
use crate::models::{EntriesResponse, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Serves resources through the shared cache
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Creates a new AppState around the given dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Creates a disk-backed AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Dispatcher::from_config(config))
    }

    pub fn cache(&self) -> &Cache {
        self.dispatcher.cache()
    }
}

// == Response Framing ==
/// Frames a resource with the headers every file response carries.
pub fn send_response(status: StatusCode, resource: Resource) -> Response {
    let content_type = HeaderValue::from_str(&resource.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    (
        status,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_LENGTH, HeaderValue::from(resource.body.len())),
            (header::CONNECTION, HeaderValue::from_static("close")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        resource.body,
    )
        .into_response()
}

/// Handler for GET / and GET /*path
///
/// Serves the requested resource, or the 404 page if it does not exist.
pub async fn file_handler(State(state): State<AppState>, uri: Uri) -> Response {
    match state.dispatcher.serve(uri.path()).await {
        Ok(resource) => send_response(StatusCode::OK, resource),
        Err(ServerError::NotFound(_)) => {
            let page = state.dispatcher.not_found_page().await;
            send_response(StatusCode::NOT_FOUND, page)
        }
        Err(err) => {
            error!(path = uri.path(), error = %err, "failed to serve resource");
            err.into_response()
        }
    }
}

/// Handler for GET /_cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache();
    Json(
        StatsResponse::new(&cache.stats(), cache.max_entries())
            .with_refreshes(state.dispatcher.refreshes()),
    )
}

/// Handler for GET /_cache/entries
///
/// Lists cached resources from most to least recently used.
pub async fn entries_handler(State(state): State<AppState>) -> Json<EntriesResponse> {
    Json(EntriesResponse::new(&state.cache().snapshot()))
}

/// Handler for GET /_health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Cache, ManualClock};
    use crate::content::MemoryLoader;
    use crate::dispatch::Origin;
    use bytes::Bytes;

    fn state_with(files: &[(&str, &str)]) -> AppState {
        let loader = Arc::new(MemoryLoader::new());
        for (path, body) in files {
            loader.insert(*path, *body);
        }
        let cache = Cache::with_clock(10, 0, Arc::new(ManualClock::default()));
        AppState::new(
            Dispatcher::new(cache, loader)
                .with_server_root("root")
                .with_server_files("files"),
        )
    }

    #[test]
    fn test_send_response_headers() {
        let resource = Resource {
            content_type: "text/plain".to_string(),
            body: Bytes::from_static(b"hello"),
            origin: Origin::Loaded,
        };

        let response = send_response(StatusCode::OK, resource);
        let headers = response.headers();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(headers[header::CONTENT_LENGTH], "5");
        assert_eq!(headers[header::CONNECTION], "close");
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn test_file_handler_serves_index() {
        let state = state_with(&[("root/index.html", "<h1>home</h1>")]);

        let response = file_handler(State(state.clone()), Uri::from_static("/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert!(state.cache().get("index.html").is_some());
    }

    #[tokio::test]
    async fn test_file_handler_not_found() {
        let state = state_with(&[]);

        let response = file_handler(State(state), Uri::from_static("/nope.txt")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = state_with(&[]);

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.max_entries, 10);
    }

    #[tokio::test]
    async fn test_entries_handler_lists_cached_files() {
        let state = state_with(&[("root/a.txt", "a")]);
        file_handler(State(state.clone()), Uri::from_static("/a.txt")).await;

        let response = entries_handler(State(state)).await;
        assert_eq!(response.count, 1);
        assert_eq!(response.entries[0].key, "a.txt");
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
