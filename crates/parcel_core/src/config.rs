//! Store configuration.
//!
//! # Responsibility
//! - Describe where the parcel database lives and how connections behave.
//! - Carry the logging settings a host passes to `init_logging`.
//!
//! # Invariants
//! - Every field has a default, so an empty document is a valid config.
//! - `busy_timeout_ms` must fit SQLite's `i32` millisecond timeout.

use crate::db::{DbError, DbResult};
use crate::logging::{default_log_level, init_logging};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const MAX_BUSY_TIMEOUT_MS: u64 = i32::MAX as u64;

/// Settings for opening the parcel store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. `None` opens a private in-memory database.
    pub db_path: Option<PathBuf>,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` leaves logging off.
    pub log_dir: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Config for a file-backed database with default settings.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Returns the busy timeout as a `Duration`.
    ///
    /// # Errors
    /// - `DbError::InvalidConfig` when `busy_timeout_ms` exceeds `i32::MAX`.
    pub fn busy_timeout(&self) -> DbResult<Duration> {
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(DbError::InvalidConfig {
                field: "busy_timeout_ms",
                reason: format!(
                    "{} exceeds the maximum of {MAX_BUSY_TIMEOUT_MS} milliseconds",
                    self.busy_timeout_ms
                ),
            });
        }
        Ok(Duration::from_millis(self.busy_timeout_ms))
    }

    /// Starts file logging when `log_dir` is set. No-op otherwise.
    ///
    /// # Errors
    /// - Same as [`init_logging`].
    pub fn init_logging(&self) -> Result<(), String> {
        match self.log_dir.as_deref() {
            Some(dir) => init_logging(&self.log_level, dir),
            None => Ok(()),
        }
    }
}
