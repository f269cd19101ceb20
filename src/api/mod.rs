//! API Module
//!
//! HTTP handlers and routing for the static file server.
//!
//! # Endpoints
//! - `GET /` and `GET /*path` - Serve resources from the server root
//! - `GET /_cache/stats` - Cache statistics
//! - `GET /_cache/entries` - Cache listing
//! - `GET /_health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
