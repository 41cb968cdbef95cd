//! Background Tasks Module
//!
//! Contains background tasks that run alongside foreground cache access.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired cache entries at configured intervals
//! - Snapshot Save: Writes the store to disk on a timer and on flush requests

mod cleanup;
mod saver;

pub use cleanup::spawn_cleanup_task;
pub use saver::{spawn_save_task, SaverHandle};
