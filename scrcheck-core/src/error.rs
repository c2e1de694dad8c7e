//! Core error types
//!
//! Configuration and I/O faults are raised lazily: a tokenizer only reports
//! them from the `next()` call that actually needed the converter or file.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the reference model, the marker configuration and the
/// tokenizer.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A writing system names a legacy encoding that cannot be resolved
    #[error("no encoding converter '{encoding}' available for writing system '{writing_system}'")]
    MissingConverter {
        /// Writing system whose text needed conversion
        writing_system: String,
        /// Converter name from the registry
        encoding: String,
    },

    /// Marker mapping table is inconsistent
    #[error("malformed marker mapping: {0}")]
    MalformedMapping(String),

    /// Any other configuration problem
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A source file could not be read
    #[error("failed to read source file {path:?}: {source}")]
    Io {
        /// The file that was being opened
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A reference or range violates its invariants
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(err.to_string())
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
