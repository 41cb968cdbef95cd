//! Cache Module
//!
//! Provides the in-memory store with TTL expiration and the `SyncCache`
//! handle that runs its background tasks.

mod entry;
mod handle;
mod store;


// Re-export public types
pub use entry::Entry;
pub use handle::{CacheValue, SyncCache};
pub use store::{MergeReport, Snapshot, Store};
