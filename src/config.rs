//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// What the persister does when a timer-triggered save fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveErrorPolicy {
    /// Log the failure at error level and keep running
    #[default]
    Log,
    /// Log the failure and terminate the process with status 1
    Exit,
}

impl FromStr for SaveErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "exit" => Ok(Self::Exit),
            other => Err(format!("unknown save error policy '{}'", other)),
        }
    }
}

/// Cache and server configuration parameters.
///
/// A zero interval disables the corresponding background task, and a missing
/// `persist_file` disables persistence entirely.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interval between janitor sweeps
    pub cleanup_interval: Duration,
    /// Interval between timer-triggered snapshots
    pub save_interval: Duration,
    /// Snapshot destination
    pub persist_file: Option<PathBuf>,
    /// Reaction to a failed timer-triggered save
    pub save_error_policy: SaveErrorPolicy,
    /// Merge an existing snapshot into the cache before serving
    pub load_on_start: bool,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CLEANUP_INTERVAL` - Janitor interval in seconds (default: 1)
    /// - `SAVE_INTERVAL` - Snapshot interval in seconds (default: 60)
    /// - `PERSIST_FILE` - Snapshot path (default: unset, persistence disabled)
    /// - `SAVE_ERROR_POLICY` - `log` or `exit` (default: log)
    /// - `LOAD_ON_START` - Load an existing snapshot at startup (default: true)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cleanup_interval: env_parse::<u64>("CLEANUP_INTERVAL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            save_interval: env_parse::<u64>("SAVE_INTERVAL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.save_interval),
            persist_file: env::var("PERSIST_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            save_error_policy: env_parse("SAVE_ERROR_POLICY")
                .unwrap_or(defaults.save_error_policy),
            load_on_start: env_parse("LOAD_ON_START").unwrap_or(defaults.load_on_start),
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Returns a copy of this configuration with the three cache lifecycle knobs replaced.
    pub fn with_lifecycle(
        mut self,
        cleanup_interval: Duration,
        save_interval: Duration,
        persist_file: Option<PathBuf>,
    ) -> Self {
        self.cleanup_interval = cleanup_interval;
        self.save_interval = save_interval;
        self.persist_file = persist_file;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(1),
            save_interval: Duration::from_secs(60),
            persist_file: None,
            save_error_policy: SaveErrorPolicy::Log,
            load_on_start: true,
            server_port: 3000,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
