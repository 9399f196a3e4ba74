//! Configuration management for the reminders binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::persistence::STORAGE_KEY;
use crate::reducer::PersistenceMode;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where and under which key the state is stored
    pub storage: StorageConfig,
    /// When mutations reach storage
    pub persistence: PersistenceMode,
    /// Seconds to wait for pending writes on shutdown
    pub shutdown_timeout_secs: u64,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per key
    pub data_dir: PathBuf,
    /// Key of the persisted document
    pub key: String,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// Reads:
    /// - `REMINDERS_DATA_DIR` (default `./.reminders`)
    /// - `REMINDERS_STORAGE_KEY` (default `reminder-lists-storage`)
    /// - `REMINDERS_PERSISTENCE`: `fire-and-forget` or `strict`
    /// - `REMINDERS_SHUTDOWN_TIMEOUT_SECS` (default 5)
    /// - `REMINDERS_LOG_LEVEL` (default `info`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            storage: StorageConfig {
                data_dir: lookup("REMINDERS_DATA_DIR")
                    .map_or_else(|| PathBuf::from("./.reminders"), PathBuf::from),
                key: lookup("REMINDERS_STORAGE_KEY").unwrap_or_else(|| STORAGE_KEY.to_string()),
            },
            persistence: lookup("REMINDERS_PERSISTENCE")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            shutdown_timeout_secs: lookup("REMINDERS_SHUTDOWN_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            log_level: lookup("REMINDERS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Shutdown timeout as a `Duration`
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
