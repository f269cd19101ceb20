//! MIME Resolution Module
//!
//! Maps a resource path to its content type by file extension.

use std::path::Path;

/// Content type for extensions nothing else claims.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Returns the MIME type for `path`, or [`DEFAULT_MIME_TYPE`].
pub fn resolve(path: impl AsRef<Path>) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
}
