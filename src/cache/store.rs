//! Cache Store Module
//!
//! Main cache engine: a HashMap behind a single reader/writer lock with lazy
//! and eager TTL expiration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::debug;

use crate::cache::Entry;
use crate::error::{CacheError, Result};

/// Full key to entry mapping, as captured by a snapshot.
pub type Snapshot<V> = HashMap<String, Entry<V>>;

const NEVER_CHANGED: i64 = i64::MIN;

// == Merge Report ==
/// Outcome of merging a loaded snapshot into a live store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Loaded entries written into the store
    pub restored: usize,
    /// Loaded entries discarded because they had already expired
    pub skipped_expired: usize,
    /// Loaded entries discarded because a live, unexpired entry held the key
    pub kept_live: usize,
}

// == Cache Store ==
/// Thread-safe cache storage with TTL support.
#[derive(Debug)]
pub struct Store<V> {
    /// Key-value storage
    entries: RwLock<Snapshot<V>>,
    /// Unix microseconds of the last successful set/update
    last_change: AtomicI64,
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Store<V> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            last_change: AtomicI64::new(NEVER_CHANGED),
        }
    }

    // == Get ==
    /// Retrieves a clone of the value stored under `key`.
    ///
    /// A hit refreshes the entry's access bookkeeping. An expired hit deletes
    /// the entry and reports `NotFound`. The lookup only blocks writers; the
    /// lock is upgraded to exclusive for the mutation.
    pub fn get(&self, key: &str) -> Result<V>
    where
        V: Clone,
    {
        let entries = self.entries.upgradable_read();
        let now = Utc::now();

        let expired = match entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => return Err(CacheError::NotFound(key.to_string())),
        };

        let mut entries = RwLockUpgradableReadGuard::upgrade(entries);
        if expired {
            entries.remove(key);
            debug!(key, "Removed expired entry on read");
            return Err(CacheError::NotFound(key.to_string()));
        }

        // The upgradable guard excludes other writers, so the entry is still here
        let entry = entries
            .get_mut(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;
        entry.touch(now);
        Ok(entry.value.clone())
    }

    // == Set ==
    /// Inserts a new entry. Fails with `AlreadyExists` if the key is present,
    /// whether or not that entry has expired.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        let key = key.into();
        let mut entries = self.entries.write();
        let now = Utc::now();

        if entries.contains_key(&key) {
            return Err(CacheError::AlreadyExists(key));
        }

        entries.insert(key, Entry::new(value, ttl, now));
        self.mark_changed(now);
        Ok(())
    }

    // == Update ==
    /// Replaces the value of an existing entry. TTL and creation time are kept,
    /// and expiry is not checked.
    pub fn update(&self, key: &str, value: V) -> Result<()> {
        let mut entries = self.entries.write();
        let now = Utc::now();

        let entry = entries
            .get_mut(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;
        entry.replace(value, now);
        self.mark_changed(now);
        Ok(())
    }

    // == Remove ==
    /// Removes an entry by key. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    // == Keys ==
    /// Returns all keys, sorted. Expired entries that have not been swept yet
    /// are included.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    // == Last Change ==
    /// Timestamp of the last successful set or update, `None` if never mutated.
    pub fn last_change(&self) -> Option<DateTime<Utc>> {
        match self.last_change.load(Ordering::Acquire) {
            NEVER_CHANGED => None,
            micros => DateTime::from_timestamp(
                micros.div_euclid(1_000_000),
                (micros.rem_euclid(1_000_000) * 1_000) as u32,
            ),
        }
    }

    fn mark_changed(&self, now: DateTime<Utc>) {
        self.last_change.store(now.timestamp_micros(), Ordering::Release);
    }

    // == Remove Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Peek ==
    /// Returns a copy of the entry with its metadata, without touching access
    /// bookkeeping or evicting it when expired.
    pub fn peek(&self, key: &str) -> Option<Entry<V>>
    where
        V: Clone,
    {
        self.entries.read().get(key).cloned()
    }

    // == Snapshot Access ==
    /// Runs `f` against the whole map under the shared lock.
    pub fn with_entries<R>(&self, f: impl FnOnce(&Snapshot<V>) -> R) -> R {
        f(&*self.entries.read())
    }

    // == Merge ==
    /// Merges loaded entries into the live map.
    ///
    /// A loaded entry is written only when the live key is absent or expired
    /// and the loaded entry itself is still valid.
    pub fn merge(&self, loaded: Snapshot<V>) -> MergeReport {
        let mut report = MergeReport::default();
        let mut entries = self.entries.write();
        let now = Utc::now();

        for (key, entry) in loaded {
            if entry.is_expired_at(now) {
                report.skipped_expired += 1;
                continue;
            }
            match entries.get(&key) {
                Some(live) if !live.is_expired_at(now) => report.kept_live += 1,
                _ => {
                    entries.insert(key, entry);
                    report.restored += 1;
                }
            }
        }

        report
    }

    // == Length ==
    /// Returns the current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
