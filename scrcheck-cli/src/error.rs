//! Error handling for the CLI application

use std::fmt;

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// A pattern matched no source files
    NoSourceFiles(String),
    /// A `--from`/`--to` reference could not be read
    InvalidReference(String),
    /// `--check` named a check that does not exist
    UnknownCheck(String),
    /// Project configuration problem
    ConfigError(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NoSourceFiles(patterns) => write!(f, "No source files found: {patterns}"),
            CliError::InvalidReference(msg) => write!(f, "Invalid reference: {msg}"),
            CliError::UnknownCheck(name) => write!(f, "Unknown check: {name}"),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;
