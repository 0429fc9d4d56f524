//! SQLite connection bootstrap and parcel schema migrations.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the parcel store.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Connections returned by `open_*` have the `parcel` table in place.
//! - Config values SQLite cannot represent are rejected before any file is opened.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_with_config};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, migrating or querying the parcel database.
#[derive(Debug)]
pub enum DbError {
    /// Error reported by SQLite, including lookups that matched no row.
    Sqlite(rusqlite::Error),
    /// Database was migrated by a newer build than this one.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A `StoreConfig` field holds a value the connection cannot use.
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "parcel database is at schema version {db_version}, this build supports up to {latest_supported}"
            ),
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid store config `{field}`: {reason}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::InvalidConfig { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
