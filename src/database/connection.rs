/*!
 * Database connection management.
 *
 * The connection is acquired once per run and released when the wrapper
 * is dropped, on every exit path.
 */

use log::{debug, info};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

use super::schema;
use crate::errors::ImportError;

/// Owned SQLite connection for a single import run
pub struct DatabaseConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Underlying connection
    connection: Connection,
}

impl DatabaseConnection {
    /// Open an existing database file
    ///
    /// The file must already exist unless `create` is set; schema is never
    /// touched here.
    pub fn open<P: AsRef<Path>>(db_path: P, create: bool) -> Result<Self, ImportError> {
        let db_path = db_path.as_ref().to_path_buf();

        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if create {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        let connection = Connection::open_with_flags(&db_path, flags)?;
        info!("Connected to database: {}", db_path.display());

        Ok(Self {
            db_path,
            connection,
        })
    }

    /// Create an in-memory database with the localization tables (for testing)
    pub fn new_in_memory() -> Result<Self, ImportError> {
        debug!("Creating in-memory database");

        let connection = Connection::open_in_memory()?;
        schema::create_tables(&connection)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection,
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Shared access to the connection
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Exclusive access, needed to open a transaction
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }
}

impl Drop for DatabaseConnection {
    fn drop(&mut self) {
        info!("Connection closed.");
    }
}
