//! File Loader Module
//!
//! Reads resources from persistent storage.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::{Result, ServerError};

// == File Loader Trait ==
/// Source of resource bytes.
///
/// Implementations block; async callers run them on the blocking pool.
pub trait FileLoader: Send + Sync + fmt::Debug {
    /// Reads the whole resource at `path`.
    ///
    /// Returns `ServerError::NotFound` when nothing readable exists there.
    fn load(&self, path: &Path) -> Result<Vec<u8>>;
}

// == Disk Loader ==
/// Loads files from the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskLoader;

impl FileLoader for DiskLoader {
    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        let not_found = || ServerError::NotFound(path.display().to_string());

        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(not_found()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(err) => return Err(err.into()),
        }

        fs::read(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => not_found(),
            _ => ServerError::Io(err),
        })
    }
}

// == Memory Loader ==
/// Serves resources from an in-memory map, for tests and embedded content.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the resource at `path`.
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), content.into());
    }

    /// Removes the resource at `path`.
    pub fn remove(&self, path: impl AsRef<Path>) {
        self.files.write().remove(path.as_ref());
    }
}

impl FileLoader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| ServerError::NotFound(path.display().to_string()))
    }
}
