/*!
 * Schema checks for the localization database.
 *
 * The importer never migrates anything. It only verifies that the two
 * tables it writes to exist, and can bootstrap them on an empty database
 * when asked to.
 */

use log::{debug, info};
use rusqlite::Connection;

use crate::errors::ImportError;

/// Tables the importer writes to
pub const REQUIRED_TABLES: [&str; 2] = ["attribute", "localization"];

/// Fail when one of the required tables is missing
pub fn verify_schema(conn: &Connection) -> Result<(), ImportError> {
    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(ImportError::Schema(format!(
                "table '{}' does not exist",
                table
            )));
        }
    }

    debug!("Schema contains tables: {}", REQUIRED_TABLES.join(", "));
    Ok(())
}

/// Check whether a table exists
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, ImportError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Create the attribute and localization tables if they are absent
pub fn create_tables(conn: &Connection) -> Result<(), ImportError> {
    info!("Creating attribute and localization tables");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS attribute (
            AT_ID INTEGER PRIMARY KEY AUTOINCREMENT,
            AT_NAME TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS localization (
            LC_ID INTEGER PRIMARY KEY AUTOINCREMENT,
            LC_AT_1 INTEGER REFERENCES attribute(AT_ID),
            LC_AT_2 INTEGER REFERENCES attribute(AT_ID),
            LC_AT_3 INTEGER REFERENCES attribute(AT_ID),
            LC_AT_4 INTEGER REFERENCES attribute(AT_ID),
            LC_TEXT_DE TEXT NOT NULL,
            LC_TEXT_EN TEXT NOT NULL,
            UNIQUE (LC_AT_1, LC_AT_2, LC_AT_3, LC_AT_4)
        );
        "#,
    )?;

    Ok(())
}
