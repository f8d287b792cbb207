/*!
 * Error types for the locimport application.
 *
 * Row-level errors are recovered by the importer (logged, row skipped).
 * Everything else ends the run.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while importing a localization file
#[derive(Error, Debug)]
pub enum ImportError {
    /// The input file does not exist
    #[error("CSV file not found: {}", .path.display())]
    MissingInput {
        /// Path that was checked
        path: PathBuf,
    },

    /// A data row does not have the expected number of fields
    #[error("Malformed line {line}: expected {expected} fields, found {found}: {raw}")]
    RowShape {
        /// Line number in the input file
        line: u64,
        /// Expected field count
        expected: usize,
        /// Actual field count
        found: usize,
        /// Raw row content
        raw: String,
    },

    /// The database rejected a row through one of its integrity rules
    #[error("Duplicate or invalid entry at line {line}: {message}")]
    ConstraintViolation {
        /// Line number in the input file
        line: u64,
        /// Message reported by the database
        message: String,
    },

    /// Any database failure that is not recoverable per row
    #[error("SQLite error: {0}")]
    FatalDatabase(#[from] rusqlite::Error),

    /// The target database lacks a required table
    #[error("Schema error: {0}")]
    Schema(String),

    /// The input could not be read as delimited UTF-8 text
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File system failure
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// Whether the importer skips the offending row and keeps going
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            Self::RowShape { .. } | Self::ConstraintViolation { .. }
        )
    }
}
