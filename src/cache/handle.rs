//! Cache Handle Module
//!
//! `SyncCache` ties a [`Store`] to its janitor and snapshot tasks.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::{Entry, MergeReport, Store};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::persist::{self, JsonCodec, SnapshotCodec};
use crate::tasks::{spawn_cleanup_task, spawn_save_task, SaverHandle};

/// Bounds every cached payload type must satisfy.
pub trait CacheValue: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

// == Sync Cache ==
/// Thread-safe cache handle with TTL expiry, a background janitor and
/// snapshot persistence.
///
/// The default payload is `serde_json::Value`, which keeps each value's
/// runtime type through a snapshot. Dropping the handle stops both
/// background tasks.
///
/// Constructing a cache with a non-zero cleanup interval or a persistence
/// file spawns tokio tasks and therefore must happen inside a tokio runtime.
pub struct SyncCache<V = serde_json::Value> {
    store: Arc<Store<V>>,
    codec: Arc<dyn SnapshotCodec<V>>,
    janitor_token: CancellationToken,
    saver_token: CancellationToken,
    janitor: Mutex<Option<JoinHandle<()>>>,
    saver: Option<SaverHandle>,
}

impl<V: CacheValue> SyncCache<V> {
    // == Constructors ==
    /// Creates a cache using the JSON snapshot codec.
    ///
    /// A zero `cleanup_interval` disables the janitor, a zero `save_interval`
    /// disables timer-triggered snapshots and `None` disables persistence.
    pub fn new(
        cleanup_interval: Duration,
        save_interval: Duration,
        persist_file: Option<PathBuf>,
    ) -> Self {
        let config = Config::default().with_lifecycle(cleanup_interval, save_interval, persist_file);
        Self::from_config(&config)
    }

    /// Creates a cache from the lifecycle settings in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_codec(config, Arc::new(JsonCodec))
    }

    /// Creates a cache that snapshots through `codec`.
    pub fn with_codec(config: &Config, codec: Arc<dyn SnapshotCodec<V>>) -> Self {
        let store = Arc::new(Store::new());
        let janitor_token = CancellationToken::new();
        let saver_token = CancellationToken::new();

        let janitor = spawn_cleanup_task(
            store.clone(),
            config.cleanup_interval,
            janitor_token.clone(),
        );

        let saver = config.persist_file.clone().map(|path| {
            spawn_save_task(
                store.clone(),
                codec.clone(),
                path,
                config.save_interval,
                config.save_error_policy,
                saver_token.clone(),
            )
        });

        Self {
            store,
            codec,
            janitor_token,
            saver_token,
            janitor: Mutex::new(janitor),
            saver,
        }
    }

    // == Store Operations ==
    /// Returns the value for `key`, or `NotFound` if it is absent or expired.
    pub fn get(&self, key: &str) -> Result<V> {
        self.store.get(key)
    }

    /// Inserts a new entry; `Duration::ZERO` never expires.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        self.store.set(key, value, ttl)
    }

    /// Replaces the value of an existing entry.
    pub fn update(&self, key: &str, value: V) -> Result<()> {
        self.store.update(key, value)
    }

    /// Removes `key` if present.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.store.remove(key)
    }

    /// Sorted list of every stored key.
    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    /// Sweeps expired entries now, returning how many were removed.
    pub fn remove_expired(&self) -> usize {
        self.store.remove_expired()
    }

    /// Time of the last successful set or update.
    pub fn last_change(&self) -> Option<DateTime<Utc>> {
        self.store.last_change()
    }

    /// Copy of the entry with metadata, without read bookkeeping.
    pub fn peek(&self, key: &str) -> Option<Entry<V>> {
        self.store.peek(key)
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // == Persistence ==
    /// Writes a snapshot to `path`. This blocks on file I/O; async callers
    /// should prefer [`SyncCache::flush`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        persist::save(&self.store, self.codec.as_ref(), path.as_ref())
    }

    /// Merges the snapshot at `path` into the cache.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<MergeReport> {
        persist::load(&self.store, self.codec.as_ref(), path.as_ref())
    }

    /// Saves to the configured persistence file through the snapshot task and
    /// waits for it to finish.
    pub async fn flush(&self) -> Result<()> {
        match &self.saver {
            Some(saver) => saver.flush().await,
            None => Err(CacheError::PersistenceDisabled),
        }
    }

    /// Whether a snapshot task was started for a persistence file.
    pub fn persistence_enabled(&self) -> bool {
        self.saver.is_some()
    }

    /// Configured snapshot destination, if any.
    pub fn persist_file(&self) -> Option<&Path> {
        self.saver.as_ref().map(SaverHandle::path)
    }

    // == Lifecycle ==
    /// Stops the janitor. Expired entries are still dropped lazily on read.
    pub fn stop_janitor(&self) {
        self.janitor_token.cancel();
    }

    /// Stops the snapshot task. Later flushes fail with `Internal`.
    pub fn stop_persister(&self) {
        self.saver_token.cancel();
    }

    /// Stops both background tasks and waits for them to exit.
    pub async fn shutdown(&self) {
        self.stop_janitor();
        self.stop_persister();

        let janitor = self.janitor.lock().take();
        if let Some(janitor) = janitor {
            let _ = janitor.await;
        }
        if let Some(saver) = &self.saver {
            saver.join().await;
        }
    }
}

impl<V> Drop for SyncCache<V> {
    fn drop(&mut self) {
        self.janitor_token.cancel();
        self.saver_token.cancel();
    }
}

impl<V> fmt::Debug for SyncCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncCache")
            .field("entries", &self.store.len())
            .field("janitor_running", &!self.janitor_token.is_cancelled())
            .field("persist_file", &self.saver.as_ref().map(SaverHandle::path))
            .finish()
    }
}
