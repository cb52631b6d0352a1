//! Process-wide connection handle.
//!
//! # Responsibility
//! - Hold the one SQLite connection used by repositories.
//! - Serialize access so check-then-write sequences run single-writer.
//! - Provide an explicit close step instead of relying on drop order.

use super::{open_db, open_db_in_memory, DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// Owned, migrated SQLite connection guarded by a mutex.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens a file-backed database and applies pending migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open_db(path).map(Self::from_connection)
    }

    /// Opens a private in-memory database and applies pending migrations.
    pub fn open_in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::from_connection)
    }

    /// Wraps an already configured connection.
    ///
    /// No migration is applied here; repositories verify schema readiness
    /// themselves.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Runs `f` while holding the connection lock.
    pub fn with_conn<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let guard = self.conn.lock().map_err(|_| DbError::ConnectionPoisoned)?;
        f(&guard)
    }

    /// Closes the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> DbResult<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| DbError::ConnectionPoisoned)?;
        match conn.close() {
            Ok(()) => {
                info!("event=db_close module=db status=ok");
                Ok(())
            }
            Err((_conn, err)) => {
                error!(
                    "event=db_close module=db status=error error_code=db_close_failed error={}",
                    err
                );
                Err(err.into())
            }
        }
    }
}
