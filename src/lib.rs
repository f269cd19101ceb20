//! Mini Webserver - A small static file server
//!
//! Serves files from a server root through a bounded LRU content cache,
//! reloading cached files once they go stale.

pub mod api;
pub mod cache;
pub mod config;
pub mod content;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::Cache;
pub use config::Config;
pub use dispatch::Dispatcher;
pub use tasks::spawn_sweep_task;
