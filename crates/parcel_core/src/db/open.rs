//! Connection bootstrap for the parcel database.
//!
//! # Invariants
//! - Returned connections have a busy timeout set.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::config::StoreConfig;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens (or creates) a parcel database file with default settings.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with_config(&StoreConfig::file(path.as_ref()))
}

/// Opens a private in-memory parcel database with default settings.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_db_with_config(&StoreConfig::default())
}

/// Opens the database described by `config` and applies pending migrations.
///
/// # Errors
/// - `DbError::InvalidConfig` before touching the file when a setting is out
///   of range.
pub fn open_db_with_config(config: &StoreConfig) -> DbResult<Connection> {
    let mode = if config.db_path.is_some() {
        "file"
    } else {
        "memory"
    };
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let busy_timeout = match config.busy_timeout() {
        Ok(timeout) => timeout,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_config_invalid error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    let opened = match config.db_path.as_deref() {
        Some(path) => Connection::open(path),
        None => Connection::open_in_memory(),
    };
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    if let Err(err) = bootstrap_connection(&mut conn, busy_timeout) {
        error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err);
    }

    info!(
        "event=db_open module=db status=ok mode={} duration_ms={}",
        mode,
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.busy_timeout(busy_timeout)?;
    apply_migrations(conn)?;
    Ok(())
}
