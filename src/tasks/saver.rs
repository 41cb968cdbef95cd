//! Snapshot Save Task
//!
//! Background task that writes the store to its snapshot file on a timer and
//! whenever a flush is requested.

use std::future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cache::Store;
use crate::config::SaveErrorPolicy;
use crate::error::{CacheError, Result};
use crate::persist::{self, SnapshotCodec};

type FlushReply = oneshot::Sender<Result<()>>;

// == Saver Handle ==
/// Handle to a running save task.
#[derive(Debug)]
pub struct SaverHandle {
    path: PathBuf,
    requests: mpsc::Sender<FlushReply>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SaverHandle {
    /// Asks the task to save now and waits for the result.
    ///
    /// Failures are returned to the caller and never trigger the timer-save
    /// error policy.
    pub async fn flush(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(reply)
            .await
            .map_err(|_| CacheError::Internal("save task is not running".to_string()))?;
        response
            .await
            .map_err(|_| CacheError::Internal("save task stopped before replying".to_string()))?
    }

    /// Snapshot destination of this task.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits for the task to exit. Only the first call waits.
    pub async fn join(&self) {
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

// == Save Task ==
struct SaveTask<V> {
    store: Arc<Store<V>>,
    codec: Arc<dyn SnapshotCodec<V>>,
    path: PathBuf,
    policy: SaveErrorPolicy,
}

impl<V> SaveTask<V>
where
    V: Send + Sync + 'static,
{
    async fn save(&self) -> Result<()> {
        let store = self.store.clone();
        let codec = self.codec.clone();
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || persist::save(&store, codec.as_ref(), &path))
            .await
            .map_err(|e| CacheError::Internal(format!("snapshot writer failed: {}", e)))?
    }

    fn report(&self, err: &CacheError) {
        error!(error = %err, path = %self.path.display(), "Periodic snapshot failed");

        if self.policy == SaveErrorPolicy::Exit {
            error!("Terminating process after failed snapshot");
            std::process::exit(1);
        }
    }

    async fn run(
        self,
        interval: Duration,
        mut requests: mpsc::Receiver<FlushReply>,
        token: CancellationToken,
    ) {
        // An interval too large to schedule behaves like no timer at all
        let mut ticker = (!interval.is_zero())
            .then(|| Instant::now().checked_add(interval))
            .flatten()
            .map(|start| {
                let mut ticker = tokio::time::interval_at(start, interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker
            });

        info!(
            path = %self.path.display(),
            "Starting snapshot task with interval of {:?}", interval
        );

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                request = requests.recv() => {
                    let Some(reply) = request else { break };
                    let result = self.save().await;
                    let _ = reply.send(result);
                }
                _ = next_tick(&mut ticker) => {
                    if let Err(err) = self.save().await {
                        self.report(&err);
                    }
                }
            }
        }

        info!("Snapshot task stopped");
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => future::pending().await,
    }
}

/// Spawns the background save task for `path`.
///
/// With a zero `interval` no timer-triggered saves happen, but
/// [`SaverHandle::flush`] still works. The task exits when `token` is
/// cancelled; cancellation does not write a final snapshot.
pub fn spawn_save_task<V>(
    store: Arc<Store<V>>,
    codec: Arc<dyn SnapshotCodec<V>>,
    path: PathBuf,
    interval: Duration,
    policy: SaveErrorPolicy,
    token: CancellationToken,
) -> SaverHandle
where
    V: Send + Sync + 'static,
{
    let (requests, receiver) = mpsc::channel(8);
    let task = SaveTask {
        store,
        codec,
        path: path.clone(),
        policy,
    };

    SaverHandle {
        path,
        requests,
        task: Mutex::new(Some(tokio::spawn(task.run(interval, receiver, token)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::JsonCodec;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    fn codec() -> Arc<dyn SnapshotCodec<Value>> {
        Arc::new(JsonCodec)
    }

    #[tokio::test]
    async fn test_timer_saves_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let store = Arc::new(Store::new());
        store.set("a", json!("a"), Duration::ZERO).unwrap();

        let token = CancellationToken::new();
        let saver = spawn_save_task(
            store.clone(),
            codec(),
            path.clone(),
            Duration::from_millis(100),
            SaveErrorPolicy::Log,
            token.clone(),
        );

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(path.exists(), "File not created after timer save");

        let restored: Store<Value> = Store::new();
        persist::load(&restored, &JsonCodec, &path).unwrap();
        assert_eq!(restored.get("a").unwrap(), json!("a"));

        token.cancel();
        saver.join().await;
    }

    #[tokio::test]
    async fn test_flush_without_timer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let store = Arc::new(Store::new());
        store.set("a", json!(1), Duration::ZERO).unwrap();

        let token = CancellationToken::new();
        let saver = spawn_save_task(
            store,
            codec(),
            path.clone(),
            Duration::ZERO,
            SaveErrorPolicy::Log,
            token.clone(),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!path.exists(), "Zero interval must not save on its own");

        saver.flush().await.unwrap();
        assert!(path.exists());
        assert_eq!(saver.path(), path.as_path());

        token.cancel();
        saver.join().await;
    }

    #[tokio::test]
    async fn test_flush_reports_io_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("cache.db");
        let store: Arc<Store<Value>> = Arc::new(Store::new());

        let token = CancellationToken::new();
        let saver = spawn_save_task(
            store,
            codec(),
            path,
            Duration::ZERO,
            SaveErrorPolicy::Log,
            token.clone(),
        );

        let result = saver.flush().await;
        assert!(matches!(result, Err(CacheError::Io(_))));

        token.cancel();
        saver.join().await;
    }

    #[tokio::test]
    async fn test_timer_failure_with_log_policy_keeps_running() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("cache.db");
        let store: Arc<Store<Value>> = Arc::new(Store::new());

        let token = CancellationToken::new();
        let saver = spawn_save_task(
            store,
            codec(),
            path,
            Duration::from_millis(20),
            SaveErrorPolicy::Log,
            token.clone(),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;

        // Still answering requests after failed timer saves
        assert!(matches!(saver.flush().await, Err(CacheError::Io(_))));

        token.cancel();
        saver.join().await;
    }

    #[tokio::test]
    async fn test_unschedulable_interval_still_flushes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let store = Arc::new(Store::new());
        store.set("a", json!(1), Duration::ZERO).unwrap();

        let token = CancellationToken::new();
        let saver = spawn_save_task(
            store,
            codec(),
            path.clone(),
            Duration::MAX,
            SaveErrorPolicy::Log,
            token.clone(),
        );

        saver.flush().await.unwrap();
        assert!(path.exists());

        token.cancel();
        saver.join().await;
    }

    #[tokio::test]
    async fn test_flush_after_cancel_fails() {
        let dir = tempdir().unwrap();
        let store: Arc<Store<Value>> = Arc::new(Store::new());

        let token = CancellationToken::new();
        let saver = spawn_save_task(
            store,
            codec(),
            dir.path().join("cache.db"),
            Duration::from_secs(3600),
            SaveErrorPolicy::Log,
            token.clone(),
        );

        token.cancel();
        saver.join().await;

        assert!(matches!(saver.flush().await, Err(CacheError::Internal(_))));
    }
}
