// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use locimport::app_config::{Config, LogLevel, RecoverableKind};
use locimport::run_import;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for RecoverableKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliRecoverableKind {
    Constraint,
    TypeMismatch,
    TooBig,
}

impl From<CliRecoverableKind> for RecoverableKind {
    fn from(kind: CliRecoverableKind) -> Self {
        match kind {
            CliRecoverableKind::Constraint => RecoverableKind::Constraint,
            CliRecoverableKind::TypeMismatch => RecoverableKind::TypeMismatch,
            CliRecoverableKind::TooBig => RecoverableKind::TooBig,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for locimport
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// locimport - load localization strings into the local game database
#[derive(Parser, Debug)]
#[command(name = "locimport")]
#[command(version)]
#[command(about = "Import localization CSV data into SQLite")]
#[command(long_about = "locimport reads a semicolon-delimited file with the columns
attr1;attr2;attr3;attr4;text_de;text_en (one header line) and upserts it into the
attribute and localization tables of a local SQLite database.

EXAMPLES:
    locimport                                   # Use locimport.json or built-in defaults
    locimport data.csv -d game_local.db         # Explicit input and database
    locimport --dry-run data.csv                # Validate without committing
    locimport completions bash > locimport.bash # Generate bash completions")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input CSV file
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "LOCIMPORT_DATABASE")]
    database: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "locimport.json")]
    config_path: PathBuf,

    /// Field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Database error kinds that only skip the offending row
    #[arg(long, value_enum, value_delimiter = ',')]
    recoverable: Option<Vec<CliRecoverableKind>>,

    /// Read and validate everything, then roll back
    #[arg(long)]
    dry_run: bool,

    /// Create the attribute and localization tables if they are missing
    #[arg(long)]
    init_schema: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "locimport", &mut std::io::stdout());
        return Ok(());
    }

    let config = build_config(cli)?;
    log::set_max_level((&config.log_level).into());

    match run_import(&config) {
        Ok(summary) => {
            info!("Import finished: {}", summary);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

// Load the configuration file and apply command line overrides
fn build_config(cli: CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_default(&cli.config_path)?;

    if let Some(input_path) = cli.input_path {
        config.input_path = input_path;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(delimiter) = cli.delimiter {
        config.delimiter = delimiter;
    }
    if let Some(kinds) = cli.recoverable {
        config.recoverable_errors = kinds.into_iter().map(Into::into).collect();
    }
    if cli.dry_run {
        config.dry_run = true;
    }
    if cli.init_schema {
        config.init_schema = true;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}
