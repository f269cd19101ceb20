//! Request Dispatcher
//!
//! Resolves request paths to cache keys, serves cached content while it is
//! fresh and reloads it from the server root once it goes stale. The cache
//! itself never judges age; this module owns that policy.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::Duration;
use tracing::{debug, warn, Level};

use crate::cache::{Cache, Clock, Entry};
use crate::config::Config;
use crate::content::{mime, DiskLoader, FileLoader};
use crate::error::{Result, ServerError};

/// Resource served for `/`.
pub const INDEX_FILE: &str = "index.html";

/// Page served with 404 responses, looked up in the server files directory.
pub const NOT_FOUND_FILE: &str = "404.html";

/// Body used when the 404 page itself is missing.
pub const NOT_FOUND_FALLBACK: &str = "404 FILE NOT FOUND";

// == Resource ==
/// Where a served resource came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A fresh cache entry
    Cache,
    /// Loaded after a cache miss
    Loaded,
    /// Reloaded because the cached entry was stale
    Refreshed,
}

/// Content ready to be framed into a response.
#[derive(Debug, Clone)]
pub struct Resource {
    pub content_type: String,
    pub body: Bytes,
    pub origin: Origin,
}

impl Resource {
    fn from_entry(entry: &Entry, origin: Origin) -> Self {
        Self {
            content_type: entry.content_type().to_string(),
            body: entry.content().clone(),
            origin,
        }
    }
}

// == Dispatcher ==
/// Serves resources through the shared cache.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    cache: Cache,
    loader: Arc<dyn FileLoader>,
    clock: Arc<dyn Clock>,
    server_root: PathBuf,
    server_files: PathBuf,
    stale_after: Duration,
    refreshes: Arc<AtomicU64>,
}

impl Dispatcher {
    // == Constructor ==
    /// Creates a dispatcher serving `./serverroot` with a 60 second
    /// staleness threshold. Ages are measured with the cache's clock.
    pub fn new(cache: Cache, loader: Arc<dyn FileLoader>) -> Self {
        let defaults = Config::default();
        let clock = cache.clock();

        Self {
            cache,
            loader,
            clock,
            server_root: defaults.server_root,
            server_files: defaults.server_files,
            stale_after: seconds(defaults.stale_after),
            refreshes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a disk-backed dispatcher and its cache from configuration.
    pub fn from_config(config: &Config) -> Self {
        let cache = Cache::new(config.max_entries, config.index_buckets);

        Self::new(cache, Arc::new(DiskLoader))
            .with_server_root(&config.server_root)
            .with_server_files(&config.server_files)
            .with_stale_after(config.stale_after)
    }

    pub fn with_server_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.server_root = root.into();
        self
    }

    pub fn with_server_files(mut self, dir: impl Into<PathBuf>) -> Self {
        self.server_files = dir.into();
        self
    }

    /// Sets the age in seconds past which cached entries are reloaded.
    pub fn with_stale_after(mut self, secs: u64) -> Self {
        self.stale_after = seconds(secs);
        self
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Number of requests that found a stale entry and reloaded it.
    ///
    /// Each of these also counts as a hit in the cache's own stats, since the
    /// lookup did find an entry.
    pub fn refreshes(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    // == Serve ==
    /// Serves the resource named by a request path such as `/` or
    /// `/css/site.css`.
    pub async fn serve(&self, request_path: &str) -> Result<Resource> {
        let key = resolve_key(request_path)
            .ok_or_else(|| ServerError::NotFound(request_path.to_string()))?;
        self.fetch(&key).await
    }

    // == Fetch ==
    /// Returns the resource for `key`, consulting the cache first.
    ///
    /// A cached entry older than the staleness threshold is deleted, loaded
    /// again and put back before being served. Load I/O never happens under
    /// the cache lock. If the cache refuses the fresh content, it is still
    /// served, just not cached.
    pub async fn fetch(&self, key: &str) -> Result<Resource> {
        let mut origin = Origin::Loaded;

        if let Some(entry) = self.cache.get(key) {
            let now = self.clock.now();
            if !entry.is_older_than(self.stale_after, now) {
                self.log_listing();
                return Ok(Resource::from_entry(&entry, Origin::Cache));
            }

            debug!(
                key,
                age_secs = entry.age(now).num_seconds(),
                "refreshing stale cache entry"
            );
            if let Err(err) = self.cache.delete(&entry.handle()) {
                // Someone else already removed or replaced it
                debug!(key, error = %err, "stale entry already gone");
            }
            self.refreshes.fetch_add(1, Ordering::Relaxed);
            origin = Origin::Refreshed;
        }

        let body = self.load(self.server_root.join(key)).await?;
        let content_type = mime::resolve(key);

        if let Err(err) = self.cache.put(key, &content_type, &body) {
            warn!(key, error = %err, "serving resource uncached");
        }
        self.log_listing();

        Ok(Resource {
            content_type,
            body: Bytes::from(body),
            origin,
        })
    }

    // == Not Found Page ==
    /// Returns the 404 page, or a plain-text fallback if it cannot be read.
    pub async fn not_found_page(&self) -> Resource {
        let path = self.server_files.join(NOT_FOUND_FILE);

        match self.load(path.clone()).await {
            Ok(body) => Resource {
                content_type: mime::resolve(&path),
                body: Bytes::from(body),
                origin: Origin::Loaded,
            },
            Err(err) => {
                debug!(error = %err, "404 page unavailable, using fallback");
                Resource {
                    content_type: "text/plain".to_string(),
                    body: Bytes::from_static(NOT_FOUND_FALLBACK.as_bytes()),
                    origin: Origin::Loaded,
                }
            }
        }
    }

    // == Stale Sweep ==
    /// Deletes every entry older than the staleness threshold.
    ///
    /// Returns the number of entries removed. Entries refreshed by a request
    /// between the snapshot and the delete are skipped.
    pub fn sweep_stale(&self) -> usize {
        let now = self.clock.now();

        self.cache
            .snapshot()
            .iter()
            .filter(|entry| entry.is_older_than(self.stale_after, now))
            .filter(|entry| self.cache.delete(&entry.handle()).is_ok())
            .count()
    }

    async fn load(&self, path: PathBuf) -> Result<Vec<u8>> {
        let loader = Arc::clone(&self.loader);

        tokio::task::spawn_blocking(move || loader.load(&path))
            .await
            .map_err(|err| ServerError::Io(io::Error::new(io::ErrorKind::Other, err)))?
    }

    fn log_listing(&self) {
        if tracing::enabled!(Level::DEBUG) {
            debug!("cache contents:\n{}", self.cache.listing());
        }
    }
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(secs.min(i64::MAX as u64 / 1000) as i64)
}

// == Key Resolution ==
/// Maps a request path to a cache key relative to the server root.
///
/// `/` maps to [`INDEX_FILE`]. Paths that could escape the root are
/// rejected.
pub fn resolve_key(request_path: &str) -> Option<String> {
    let relative = request_path.trim_start_matches('/');
    if relative.is_empty() {
        return Some(INDEX_FILE.to_string());
    }

    if relative.contains('\\') || relative.contains('\0') {
        return None;
    }
    if relative.split('/').any(|segment| segment == "..") {
        return None;
    }
    if Path::new(relative).is_absolute() {
        return None;
    }

    Some(relative.to_string())
}
