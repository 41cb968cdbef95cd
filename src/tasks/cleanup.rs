//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::Store;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task sleeps for `interval` between sweeps and takes the store's write
/// lock only for the sweep itself. It exits when `token` is cancelled.
///
/// Returns `None` without spawning anything when `interval` is zero.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Store::<String>::new());
/// let token = CancellationToken::new();
/// let handle = spawn_cleanup_task(store.clone(), Duration::from_secs(1), token.clone());
/// // Later, during shutdown:
/// token.cancel();
/// ```
pub fn spawn_cleanup_task<V>(
    store: Arc<Store<V>>,
    interval: Duration,
    token: CancellationToken,
) -> Option<JoinHandle<()>>
where
    V: Send + Sync + 'static,
{
    if interval.is_zero() {
        debug!("TTL cleanup disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = store.remove_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }

        info!("TTL cleanup task stopped");
    }))
}
