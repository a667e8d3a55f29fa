//! Cache Size Reporter
//!
//! Background task that periodically logs how large the cache has grown.
//! The cache has no capacity bound, so this is the only signal that it keeps
//! accumulating keys.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::SwrCache;

/// Spawns a background task that reports the cache size at a fixed interval.
///
/// Logs at `warn` once the number of entries exceeds `warn_threshold`,
/// otherwise at `debug`.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_size_reporter<T>(
    cache: SwrCache<T>,
    interval_secs: u64,
    warn_threshold: usize,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache size reporter with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let size = cache.size();
            let in_flight = cache.in_flight();
            if size > warn_threshold {
                warn!(
                    size,
                    in_flight, warn_threshold, "Cache size above threshold, nothing is evicted"
                );
            } else {
                debug!(size, in_flight, "Cache size report");
            }
        }
    })
}
