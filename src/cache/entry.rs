//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A single cached record: the payload plus its lifecycle metadata.
///
/// `created` and `ttl` are fixed when the entry is inserted. The remaining
/// metadata is maintained by the store under its write lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Time to live, `Duration::ZERO` = never expires
    pub ttl: Duration,
    /// Insertion timestamp
    pub created: DateTime<Utc>,
    /// Last successful value replacement
    pub updated: Option<DateTime<Utc>>,
    /// Last successful read
    pub accessed: Option<DateTime<Utc>>,
    /// Number of successful reads
    pub access_count: u64,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates a fresh entry stamped with `now`.
    pub fn new(value: V, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            value,
            ttl,
            created: now,
            updated: None,
            accessed: None,
            access_count: 0,
        }
    }

    // == Is Expired ==
    /// Checks whether the TTL has elapsed at `now`.
    ///
    /// Boundary condition: the entry is expired once `now >= created + ttl`.
    /// A zero TTL never expires, and a `created` in the future (clock skew
    /// across a snapshot reload) counts as not yet expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if self.ttl.is_zero() {
            return false;
        }
        match (now - self.created).to_std() {
            Ok(elapsed) => elapsed >= self.ttl,
            Err(_) => false,
        }
    }

    /// Checks expiry against the current wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    // == Read Bookkeeping ==
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.accessed = Some(now);
        self.access_count += 1;
    }

    // == Replace ==
    pub(crate) fn replace(&mut self, value: V, now: DateTime<Utc>) {
        self.value = value;
        self.updated = Some(now);
    }
}
