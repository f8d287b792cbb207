use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles loading, validating and overriding the import settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// SQLite database file to update
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Semicolon-delimited localization file
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Database failures that only skip the current row
    #[serde(default = "default_recoverable_errors")]
    pub recoverable_errors: Vec<RecoverableKind>,

    /// Roll back instead of committing at the end of the run
    #[serde(default)]
    pub dry_run: bool,

    /// Create the attribute/localization tables when they are missing
    #[serde(default)]
    pub init_schema: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Class of database failure that may be treated as a per-row skip
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecoverableKind {
    // @kind: UNIQUE, NOT NULL, CHECK or FOREIGN KEY rejection
    Constraint,
    // @kind: Datatype mismatch
    TypeMismatch,
    // @kind: String or blob too big
    TooBig,
}

impl RecoverableKind {
    // @returns: Matching SQLite primary result code
    pub fn error_code(&self) -> rusqlite::ErrorCode {
        match self {
            Self::Constraint => rusqlite::ErrorCode::ConstraintViolation,
            Self::TypeMismatch => rusqlite::ErrorCode::TypeMismatch,
            Self::TooBig => rusqlite::ErrorCode::TooBig,
        }
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("../dungeoncrawl_local.db")
}

fn default_input_path() -> PathBuf {
    PathBuf::from("local_data_input.csv")
}

fn default_delimiter() -> char {
    ';'
}

fn default_recoverable_errors() -> Vec<RecoverableKind> {
    vec![RecoverableKind::Constraint]
}

impl Config {
    /// Load a configuration file, falling back to defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(anyhow!("Database path must not be empty"));
        }

        if self.input_path.as_os_str().is_empty() {
            return Err(anyhow!("Input path must not be empty"));
        }

        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(anyhow!("Invalid delimiter: {:?}", self.delimiter));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: default_database_path(),
            input_path: default_input_path(),
            delimiter: default_delimiter(),
            recoverable_errors: default_recoverable_errors(),
            dry_run: false,
            init_schema: false,
            log_level: LogLevel::default(),
        }
    }
}
