//! Stale Sweep Task
//!
//! Background task that periodically drops cached resources older than the
//! dispatcher's staleness threshold, so content nobody requests again does
//! not sit in memory until it is evicted.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dispatch::Dispatcher;

/// Spawns a background task that periodically sweeps stale cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Each sweep goes through the cache's public API, so it
/// never holds the lock across the sleep.
///
/// # Arguments
/// * `dispatcher` - Shared dispatcher owning the staleness policy
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_sweep_task(dispatcher: Arc<Dispatcher>, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting stale sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = dispatcher.sweep_stale();

            if removed > 0 {
                info!("Stale sweep: removed {} entries", removed);
            } else {
                debug!("Stale sweep: no stale entries found");
            }
        }
    })
}
