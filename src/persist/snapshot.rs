//! Snapshot Files
//!
//! Saving and loading a store to and from disk.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::cache::{MergeReport, Store};
use crate::error::{CacheError, Result};
use crate::persist::SnapshotCodec;

// == Save ==
/// Writes the full contents of `store` to `path`.
///
/// The map is encoded in memory under the shared lock; the lock is released
/// before any file I/O. The bytes go to a temporary file in the destination
/// directory which is then renamed over `path`, so readers only ever see a
/// complete snapshot.
pub fn save<V>(store: &Store<V>, codec: &dyn SnapshotCodec<V>, path: &Path) -> Result<()> {
    let (count, bytes) = store.with_entries(|entries| {
        codec.encode(entries).map(|bytes| (entries.len(), bytes))
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(&bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| CacheError::Io(e.error))?;

    info!(count, path = %path.display(), "Snapshot saved");
    Ok(())
}

// == Load ==
/// Reads a snapshot from `path` and merges it into `store`.
///
/// Read and decode errors are returned before the store is touched.
pub fn load<V>(store: &Store<V>, codec: &dyn SnapshotCodec<V>, path: &Path) -> Result<MergeReport> {
    let bytes = fs::read(path)?;
    let loaded = codec.decode(&bytes)?;
    let report = store.merge(loaded);

    info!(
        restored = report.restored,
        skipped_expired = report.skipped_expired,
        kept_live = report.kept_live,
        path = %path.display(),
        "Snapshot loaded"
    );
    Ok(report)
}
