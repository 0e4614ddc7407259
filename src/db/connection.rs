use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info, warn};

use super::FileHandler;
use crate::error::{DaoError, Result};

/// Where the SQLite database lives.
#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Connection lifecycle. A fresh DAO opens lazily on first use, but once it
/// has been closed explicitly it stays closed until `open` is called.
enum State {
    Unopened,
    Open(Connection),
    Closed,
}

/// Data-access adapter over an embedded SQLite database.
pub struct SqliteDao {
    location: Location,
    state: State,
}

impl SqliteDao {
    /// Point the DAO at a database file. Nothing touches the disk until the
    /// first operation or an explicit [`SqliteDao::open`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            state: State::Unopened,
        }
    }

    /// A private in-memory database, discarded when the connection closes.
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            state: State::Unopened,
        }
    }

    /// Path of the backing file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    /// Open the database, creating the file and schema when missing. Opening
    /// an already open DAO is a no-op.
    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }

        let conn = match &self.location {
            Location::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).map_err(|err| {
                            DaoError::Connection(format!(
                                "failed to create data directory {}: {err}",
                                parent.display()
                            ))
                        })?;
                    }
                }
                Connection::open(path).map_err(|err| {
                    DaoError::Connection(format!(
                        "failed to open SQLite database {}: {err}",
                        path.display()
                    ))
                })?
            }
            Location::Memory => Connection::open_in_memory().map_err(|err| {
                DaoError::Connection(format!("failed to open in-memory database: {err}"))
            })?,
        };

        ensure_schema(&conn)?;
        info!(location = ?self.location, "database connection opened");
        self.state = State::Open(conn);
        Ok(())
    }

    /// Borrow the live connection, opening it on first use. Fails with a
    /// connection error after an explicit close.
    pub(crate) fn conn(&mut self) -> Result<&Connection> {
        if matches!(self.state, State::Unopened) {
            self.open()?;
        }

        match &self.state {
            State::Open(conn) => Ok(conn),
            _ => Err(DaoError::Connection(
                "database connection is closed".to_string(),
            )),
        }
    }
}

impl FileHandler for SqliteDao {
    fn check_db_exists(&self) -> bool {
        match &self.location {
            Location::File(path) => {
                let exists = path.exists();
                if exists {
                    info!(path = %path.display(), "database file exists");
                } else {
                    info!(path = %path.display(), "database file does not exist");
                }
                exists
            }
            Location::Memory => self.is_open(),
        }
    }

    fn close_connection(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(conn) => {
                conn.close().map_err(|(_, err)| {
                    warn!(error = %err, "failed to close database connection");
                    DaoError::Connection(format!("failed to close database: {err}"))
                })?;
                info!("database connection closed");
            }
            State::Unopened | State::Closed => {
                debug!("close requested on a connection that was not open");
            }
        }
        Ok(())
    }
}

/// Run the idempotent schema migration. `depno` on employees is deliberately
/// not a foreign key: dangling references are allowed and deleting a
/// department never cascades.
fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS departments (
            depno INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            location TEXT NOT NULL
        )",
        [],
    )
    .map_err(|err| DaoError::Connection(format!("failed to create departments table: {err}")))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS employees (
            empno INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            position TEXT NOT NULL,
            depno INTEGER
        )",
        [],
    )
    .map_err(|err| DaoError::Connection(format!("failed to create employees table: {err}")))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS employees_depno ON employees (depno)",
        [],
    )
    .map_err(|err| DaoError::Connection(format!("failed to create employees index: {err}")))?;

    Ok(())
}
