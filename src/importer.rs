/*!
 * Localization importer.
 *
 * Streams rows from the input file, resolves attribute names through a
 * lookup-then-insert protocol and inserts one localization record per
 * valid row. Everything happens in a single transaction that is only
 * committed when the whole file has been read.
 */

use log::{debug, info, warn};
use rusqlite::Connection;
use std::fmt;
use std::path::Path;

use crate::app_config::{Config, RecoverableKind};
use crate::csv_source::{CsvSource, LocalizationRow};
use crate::database::{repository, schema, DatabaseConnection, NewLocalization};
use crate::errors::ImportError;

/// Lifecycle of an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    NotStarted,
    FileCheck,
    FileMissing,
    Connected,
    /// Processing the given line
    Streaming(u64),
    Committed,
    Closed,
    /// Closed after a fatal error, nothing committed
    Aborted,
}

impl ImportState {
    /// Move to `next`, logging the change
    pub fn advance(&mut self, next: ImportState) {
        debug!("Import state: {:?} -> {:?}", self, next);
        *self = next;
    }
}

/// Knobs for a single run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    pub delimiter: u8,
    pub recoverable_errors: Vec<RecoverableKind>,
    pub dry_run: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            recoverable_errors: vec![RecoverableKind::Constraint],
            dry_run: false,
        }
    }
}

impl From<&Config> for ImportOptions {
    fn from(config: &Config) -> Self {
        Self {
            delimiter: config.delimiter_byte(),
            recoverable_errors: config.recoverable_errors.clone(),
            dry_run: config.dry_run,
        }
    }
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Data rows read, header excluded
    pub rows_read: usize,
    pub inserted: usize,
    pub attributes_created: usize,
    /// Rows with the wrong field count
    pub skipped_malformed: usize,
    /// Rows the database refused
    pub skipped_rejected: usize,
    /// False for dry runs
    pub committed: bool,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rows: {}, Inserted: {}, New attributes: {}, Malformed: {}, Rejected: {}{}",
            self.rows_read,
            self.inserted,
            self.attributes_created,
            self.skipped_malformed,
            self.skipped_rejected,
            if self.committed { "" } else { " (not committed)" }
        )
    }
}

/// Imports localization files into an open database
pub struct Importer<'c> {
    conn: &'c mut Connection,
    options: ImportOptions,
    state: ImportState,
}

impl<'c> Importer<'c> {
    pub fn new(conn: &'c mut Connection, options: ImportOptions) -> Self {
        Self {
            conn,
            options,
            state: ImportState::Connected,
        }
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    /// Return the id of the attribute with this name, creating it if needed
    pub fn resolve_attribute(&self, name: &str) -> Result<i64, ImportError> {
        Ok(repository::get_or_create_attribute(&*self.conn, name)?.id)
    }

    /// Import every data row of `path` in one transaction
    pub fn import_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ImportSummary, ImportError> {
        let result = self.import_inner(path.as_ref());
        match &result {
            Ok(_) => self.state.advance(ImportState::Closed),
            Err(_) => self.state.advance(ImportState::Aborted),
        }
        result
    }

    fn import_inner(&mut self, path: &Path) -> Result<ImportSummary, ImportError> {
        let mut source = CsvSource::open(path, self.options.delimiter)?;
        let options = self.options.clone();
        let mut summary = ImportSummary::default();

        // Dropping the transaction on an early return rolls it back
        let tx = self.conn.transaction()?;

        while let Some(row) = source.next_row()? {
            self.state.advance(ImportState::Streaming(row.line));
            summary.rows_read += 1;

            let parsed = match row.parse() {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Skipping malformed line {}: {}", row.line, row.raw());
                    debug!("{}", e);
                    summary.skipped_malformed += 1;
                    continue;
                }
            };

            match import_row(&tx, &parsed, &options, &mut summary) {
                Ok(()) => summary.inserted += 1,
                Err(e) if e.is_row_level() => {
                    warn!("{}", e);
                    summary.skipped_rejected += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if options.dry_run {
            tx.rollback()?;
            info!("Dry run, changes rolled back.");
        } else {
            tx.commit()?;
            summary.committed = true;
            self.state.advance(ImportState::Committed);
            info!("Database update complete.");
        }

        info!("{}", summary);
        Ok(summary)
    }
}

/// Resolve the attributes of one row and insert it
fn import_row(
    conn: &Connection,
    row: &LocalizationRow,
    options: &ImportOptions,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    let mut attributes = [None; 4];
    for (slot, name) in row.attribute_names.iter().enumerate() {
        if let Some(name) = name {
            let resolved = repository::get_or_create_attribute(conn, name)?;
            if resolved.created {
                summary.attributes_created += 1;
            }
            attributes[slot] = Some(resolved.id);
        }
    }

    let record = NewLocalization {
        attributes,
        text_de: row.text_de.clone(),
        text_en: row.text_en.clone(),
    };

    repository::insert_localization(conn, &record)
        .map(|_| ())
        .map_err(|e| classify_insert_error(e, row.line, &options.recoverable_errors))
}

/// Turn an insert failure into a row-level error when its kind is recoverable
pub fn classify_insert_error(
    error: rusqlite::Error,
    line: u64,
    recoverable: &[RecoverableKind],
) -> ImportError {
    let recover = error
        .sqlite_error_code()
        .is_some_and(|code| recoverable.iter().any(|kind| kind.error_code() == code));

    if recover {
        ImportError::ConstraintViolation {
            line,
            message: error.to_string(),
        }
    } else {
        ImportError::FatalDatabase(error)
    }
}

/// Run a complete import as described by the configuration
///
/// The input file is checked before anything else; when it is missing no
/// connection is opened. The connection is closed on every exit path.
pub fn run_import(config: &Config) -> Result<ImportSummary, ImportError> {
    let mut state = ImportState::NotStarted;
    state.advance(ImportState::FileCheck);

    if !config.input_path.exists() {
        state.advance(ImportState::FileMissing);
        return Err(ImportError::MissingInput {
            path: config.input_path.clone(),
        });
    }

    let mut db = DatabaseConnection::open(&config.database_path, config.init_schema)?;
    state.advance(ImportState::Connected);

    if config.init_schema {
        schema::create_tables(db.connection())?;
    }
    schema::verify_schema(db.connection())?;

    let mut importer = Importer::new(db.connection_mut(), ImportOptions::from(config));
    importer.import_file(&config.input_path)
}
