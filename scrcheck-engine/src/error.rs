//! Engine error types

use scrcheck_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while running checks or persisting annotations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Tokenizer or configuration fault from the core layer
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Project configuration is invalid
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No check with this name or id is registered
    #[error("unknown check '{0}'")]
    UnknownCheck(String),

    /// Reading or writing a store or project file failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// An annotation file could not be (de)serialized
    #[error("annotation file {path:?} is malformed: {source}")]
    Json {
        /// Offending file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
