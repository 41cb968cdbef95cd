//! Sync Cache - A thread-safe in-process key/value cache
//!
//! Provides per-entry TTL expiry, a background janitor that reclaims expired
//! entries, and snapshot persistence on a timer or on demand.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod persist;
pub mod tasks;

pub use api::AppState;
pub use cache::{Entry, MergeReport, SyncCache};
pub use config::{Config, SaveErrorPolicy};
pub use error::{CacheError, Result};
pub use persist::{JsonCodec, SnapshotCodec};
