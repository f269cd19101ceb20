//! Content Module
//!
//! Resource loading and content-type resolution used by the dispatcher.

pub mod loader;
pub mod mime;

pub use loader::{DiskLoader, FileLoader, MemoryLoader};
