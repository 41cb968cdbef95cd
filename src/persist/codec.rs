//! Snapshot Codecs
//!
//! Pluggable encoding of the full key to entry mapping.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::Snapshot;
use crate::error::{CacheError, Result};

/// Format version written by [`JsonCodec`].
pub const SNAPSHOT_VERSION: u32 = 1;

// == Codec Trait ==
/// Encodes and decodes a whole store snapshot.
///
/// Implementations must round-trip every entry field losslessly.
pub trait SnapshotCodec<V>: Send + Sync {
    /// Serializes the mapping to bytes.
    fn encode(&self, entries: &Snapshot<V>) -> Result<Vec<u8>>;

    /// Parses bytes produced by [`SnapshotCodec::encode`].
    fn decode(&self, bytes: &[u8]) -> Result<Snapshot<V>>;
}

// == JSON Codec ==
/// Versioned JSON snapshots.
///
/// With `serde_json::Value` payloads every value keeps its runtime type
/// (string, number, bool, array, object) across a save and load.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[derive(Serialize)]
struct SnapshotRef<'a, V> {
    version: u32,
    saved_at: DateTime<Utc>,
    entries: &'a Snapshot<V>,
}

#[derive(Deserialize)]
struct SnapshotFile<V> {
    version: u32,
    saved_at: DateTime<Utc>,
    entries: Snapshot<V>,
}

impl<V> SnapshotCodec<V> for JsonCodec
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    fn encode(&self, entries: &Snapshot<V>) -> Result<Vec<u8>> {
        let file = SnapshotRef {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            entries,
        };
        serde_json::to_vec(&file).map_err(|e| CacheError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Snapshot<V>> {
        let file: SnapshotFile<V> =
            serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))?;

        if file.version != SNAPSHOT_VERSION {
            return Err(CacheError::Decode(format!(
                "unsupported snapshot version {} (expected {})",
                file.version, SNAPSHOT_VERSION
            )));
        }

        debug!(saved_at = %file.saved_at, count = file.entries.len(), "Decoded snapshot");
        Ok(file.entries)
    }
}
