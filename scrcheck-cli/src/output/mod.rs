//! Output formatting module

use anyhow::Result;
use scrcheck_engine::{BookAnnotations, RunOutcome};
use std::io;

pub mod json;
pub mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Output the result of one (book, check) run
    fn format_outcome(&mut self, outcome: &RunOutcome) -> Result<()>;

    /// Output the stored state of one book
    fn format_book(&mut self, book: &BookAnnotations) -> Result<()>;

    /// Finalize output (e.g., close JSON array)
    fn finish(&mut self) -> Result<()>;
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per run or book
    Text,
    /// JSON array with full counts
    Json,
}

impl OutputFormat {
    /// Formatter writing to stdout
    pub fn stdout(self) -> Box<dyn OutputFormatter> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter::new(io::stdout())),
            OutputFormat::Json => Box::new(JsonFormatter::new(io::stdout())),
        }
    }
}

/// Display code of a book number.
pub(crate) fn book_label(book: u8) -> String {
    scrcheck_core::book_code(book)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{book}"))
}
