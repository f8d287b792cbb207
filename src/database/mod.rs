/*!
 * Database module for the localization tables.
 *
 * - `connection`: scoped SQLite connection
 * - `schema`: table checks and optional bootstrap
 * - `repository`: attribute get-or-create and localization inserts
 * - `models`: row types
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::{Attribute, LocalizationRecord, NewLocalization, ResolvedAttribute};
