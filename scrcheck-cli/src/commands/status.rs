//! Status command implementation

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use clap::Args;
use scrcheck_engine::AnnotationStore;
use std::path::PathBuf;

/// Arguments for the status command
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Annotation store directory
    #[arg(short, long, value_name = "DIR", default_value = "annotations")]
    pub store: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl StatusArgs {
    /// Execute the status command
    pub fn execute(&self) -> Result<()> {
        let store = AnnotationStore::load_dir(&self.store)
            .with_context(|| format!("Failed to load store {}", self.store.display()))?;
        if store.books().next().is_none() {
            log::warn!("no annotations in {}", self.store.display());
        }

        let mut formatter = self.format.stdout();
        for book in store.books() {
            formatter.format_book(book)?;
        }
        formatter.finish()
    }
}
