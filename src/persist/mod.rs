//! Persistence Module
//!
//! Snapshot codecs and the file-level save/load operations used by the cache
//! handle and the background save task.

mod codec;
mod snapshot;

pub use codec::{JsonCodec, SnapshotCodec, SNAPSHOT_VERSION};
pub use snapshot::{load, save};
