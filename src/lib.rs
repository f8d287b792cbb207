/*!
 * # locimport - Localization data importer
 *
 * Reads a semicolon-delimited localization file and loads it into the
 * game's local SQLite database.
 *
 * ## Features
 *
 * - Deduplicated `attribute` dictionary (get-or-create by name)
 * - One `localization` row per valid input line, with up to four
 *   attribute references and German/English text
 * - Malformed and rejected rows are reported and skipped
 * - Single transaction per run, optional dry run
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `csv_source`: Streaming reader for the input file
 * - `database`: Connection, schema checks and SQL repository
 * - `importer`: The import run itself
 * - `errors`: Error taxonomy
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod csv_source;
pub mod database;
pub mod errors;
pub mod importer;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::ImportError;
pub use importer::{run_import, ImportOptions, ImportSummary, Importer};
