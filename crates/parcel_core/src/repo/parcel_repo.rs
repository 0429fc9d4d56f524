//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the CRUD operations over the `parcel` table.
//! - Enforce the "registered only" rule for address changes and deletion.
//!
//! # Invariants
//! - `set_status` never checks the current status and never reports missing rows.
//! - `set_address` on a non-registered parcel is a silent no-op.
//! - `delete` on a non-registered parcel fails with `WrongStatusForDeletion`.
//! - Conditional writes and their follow-up status probe share one transaction:
//!   an immediate one of their own, or the caller's when one is already open.
//! - Status text is stored as given; no validation against known values.

use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, STATUS_REGISTERED};
use log::{debug, warn};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_TABLE: &str = "parcel";
const PARCEL_COLUMNS: [&str; 5] = ["number", "client", "status", "address", "created_at"];

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for parcel persistence operations.
#[derive(Debug)]
pub enum StoreError {
    /// Statement failure, including lookups that matched no row.
    Db(DbError),
    /// `delete` was called on a parcel that is no longer `registered`.
    WrongStatusForDeletion {
        number: ParcelNumber,
        status: String,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl StoreError {
    /// Returns whether this is a lookup that matched no parcel.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Db(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        )
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::WrongStatusForDeletion { number, status } => write!(
                f,
                "wrong status for deletion: parcel {number} is `{status}`, expected `{STATUS_REGISTERED}`"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for parcel records.
pub trait ParcelRepository {
    /// Inserts `parcel` (its `number` is ignored) and returns the assigned number.
    fn add(&self, parcel: &Parcel) -> StoreResult<ParcelNumber>;
    /// Loads one parcel. Fails with a not-found `Db` error when absent.
    fn get(&self, number: ParcelNumber) -> StoreResult<Parcel>;
    /// Loads every parcel of `client`, ordered by number. Empty when none.
    fn get_by_client(&self, client: ClientId) -> StoreResult<Vec<Parcel>>;
    /// Overwrites status unconditionally.
    fn set_status(&self, number: ParcelNumber, status: &str) -> StoreResult<()>;
    /// Overwrites address only while the parcel is `registered`.
    fn set_address(&self, number: ParcelNumber, address: &str) -> StoreResult<()>;
    /// Removes the parcel only while it is `registered`.
    fn delete(&self, number: ParcelNumber) -> StoreResult<()>;
}

/// SQLite-backed parcel store borrowing a caller-owned connection.
pub struct SqliteParcelStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelStore<'conn> {
    /// Wraps a connection whose `parcel` table already exists.
    ///
    /// # Errors
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema does
    ///   not match the statements this store issues.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_parcel_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Runs a conditional write and its status probe as one unit.
    ///
    /// Opens an immediate transaction when the connection is in autocommit
    /// mode. Inside a caller-owned transaction the work joins that
    /// transaction instead, and commit stays with the caller.
    fn in_write_scope<T>(
        &self,
        work: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        if !self.conn.is_autocommit() {
            return work(self.conn);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let value = work(&*tx)?;
        tx.commit()?;
        Ok(value)
    }
}

impl ParcelRepository for SqliteParcelStore<'_> {
    fn add(&self, parcel: &Parcel) -> StoreResult<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                parcel.client,
                parcel.status.as_str(),
                parcel.address.as_str(),
                parcel.created_at.as_str(),
            ],
        )?;

        let number = self.conn.last_insert_rowid();
        debug!(
            "event=parcel_add module=repo status=ok number={} client={}",
            number, parcel.client
        );
        Ok(number)
    }

    fn get(&self, number: ParcelNumber) -> StoreResult<Parcel> {
        let parcel = self.conn.query_row(
            &format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"),
            [number],
            parse_parcel_row,
        )?;
        Ok(parcel)
    }

    fn get_by_client(&self, client: ClientId) -> StoreResult<Vec<Parcel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE client = ?1 ORDER BY number ASC;"))?;
        let mut rows = stmt.query([client])?;
        let mut parcels = Vec::new();

        while let Some(row) = rows.next()? {
            parcels.push(parse_parcel_row(row)?);
        }

        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel SET status = ?2 WHERE number = ?1;",
            params![number, status],
        )?;
        debug!(
            "event=parcel_set_status module=repo status=ok number={} rows={}",
            number, changed
        );
        Ok(())
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> StoreResult<()> {
        self.in_write_scope(|conn| {
            let changed = conn.execute(
                "UPDATE parcel
                 SET address = ?2
                 WHERE number = ?1
                   AND status = ?3;",
                params![number, address, STATUS_REGISTERED],
            )?;

            if changed == 0 {
                // Fails with a not-found error when the parcel does not exist.
                let current = current_status(conn, number)?;
                debug!(
                    "event=parcel_set_address module=repo status=skipped number={} parcel_status={}",
                    number, current
                );
            }
            Ok(())
        })
    }

    fn delete(&self, number: ParcelNumber) -> StoreResult<()> {
        self.in_write_scope(|conn| {
            let changed = conn.execute(
                "DELETE FROM parcel
                 WHERE number = ?1
                   AND status = ?2;",
                params![number, STATUS_REGISTERED],
            )?;

            if changed == 0 {
                let status = current_status(conn, number)?;
                warn!(
                    "event=parcel_delete module=repo status=rejected number={} parcel_status={}",
                    number, status
                );
                return Err(StoreError::WrongStatusForDeletion { number, status });
            }
            Ok(())
        })
    }
}

fn current_status(conn: &Connection, number: ParcelNumber) -> StoreResult<String> {
    let status = conn.query_row(
        "SELECT status FROM parcel WHERE number = ?1;",
        [number],
        |row| row.get(0),
    )?;
    Ok(status)
}

fn parse_parcel_row(row: &Row<'_>) -> rusqlite::Result<Parcel> {
    Ok(Parcel {
        number: row.get("number")?,
        client: row.get("client")?,
        status: row.get("status")?,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_parcel_connection_ready(conn: &Connection) -> StoreResult<()> {
    if !table_exists(conn, PARCEL_TABLE)? {
        return Err(StoreError::MissingRequiredTable(PARCEL_TABLE));
    }

    let columns = table_columns(conn, PARCEL_TABLE)?;
    for column in PARCEL_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(StoreError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get(1)?);
    }
    Ok(columns)
}
