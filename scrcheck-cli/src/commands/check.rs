//! Check command implementation

use super::{init_logging, load_project};
use crate::error::CliError;
use crate::input::{parse_range, resolve_patterns};
use crate::output::OutputFormat;
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use scrcheck_core::{book_code, ImportSettings, SourceDomain, SourceFile};
use scrcheck_engine::{
    book_scope, builtin_checks, find_check, AnnotationStore, CheckRunner, ProjectParameters,
    ScriptureCheck,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the check command
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Source files or patterns (supports glob), read in the order given
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Project file (import kind, markers, writing systems, styles, caps)
    #[arg(short, long, value_name = "FILE")]
    pub project: Option<PathBuf>,

    /// Annotation store directory
    #[arg(short, long, value_name = "DIR", default_value = "annotations")]
    pub store: PathBuf,

    /// Check to run, by name; repeat for several (default: all)
    #[arg(short, long = "check", value_name = "NAME")]
    pub checks: Vec<String>,

    /// First reference to check, e.g. "MAT 5"
    #[arg(long, value_name = "REF")]
    pub from: Option<String>,

    /// Last reference to check, inclusive, e.g. "MAT 7"
    #[arg(long, value_name = "REF")]
    pub to: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress progress and log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CheckArgs {
    /// Execute the check command
    pub fn execute(&self) -> Result<()> {
        init_logging(self.verbose, self.quiet);
        log::debug!("Arguments: {self:?}");

        let (config, base_dir) = load_project(self.project.as_deref())?;
        let registry = Arc::new(
            config
                .registry()
                .map_err(|e| CliError::ConfigError(e.to_string()))?,
        );
        let mappings = Arc::new(
            config
                .mapping_table(&base_dir)
                .context("Failed to load marker table")?,
        );
        let range = parse_range(self.from.as_deref(), self.to.as_deref())?;

        let mut settings = ImportSettings::new(config.import.kind, mappings, Arc::clone(&registry));
        for path in resolve_patterns(&self.input)? {
            let source = SourceFile::scan(&path, SourceDomain::Main)
                .with_context(|| format!("Failed to scan {}", path.display()))?;
            settings.add_source(source);
        }

        let params = ProjectParameters::new(registry, config.styles.clone());
        let checks = select_checks(builtin_checks(&params), &self.checks)?;

        let mut store = AnnotationStore::load_dir(&self.store)
            .with_context(|| format!("Failed to load store {}", self.store.display()))?;
        let runner = CheckRunner::from_config(&config);

        let books: Vec<u8> = settings
            .books()
            .into_iter()
            .filter(|book| book_scope(*book, range).is_some())
            .collect();
        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_books(books.len() as u64);

        let mut outcomes = Vec::new();
        for book in books {
            let Some(scope) = book_scope(book, range) else {
                continue;
            };
            let label = book_code(book).unwrap_or("?");
            let book_outcomes = runner
                .run_sources(&settings, &mut store, &checks, scope)
                .with_context(|| format!("Checking {label} failed; store left unchanged"))?;
            outcomes.extend(book_outcomes);
            progress.book_completed(label);
        }
        progress.finish();

        store
            .save_dir(&self.store)
            .with_context(|| format!("Failed to save store {}", self.store.display()))?;

        let mut formatter = self.format.stdout();
        for outcome in &outcomes {
            formatter.format_outcome(outcome)?;
        }
        formatter.finish()
    }
}

/// Keeps the checks named in `names`; all of them when none are named.
fn select_checks(
    all: Vec<Box<dyn ScriptureCheck>>,
    names: &[String],
) -> Result<Vec<Box<dyn ScriptureCheck>>> {
    if names.is_empty() {
        return Ok(all);
    }
    if let Some(unknown) = names.iter().find(|name| find_check(&all, name).is_none()) {
        return Err(CliError::UnknownCheck(unknown.clone()).into());
    }
    Ok(all
        .into_iter()
        .filter(|check| names.iter().any(|n| check.name().eq_ignore_ascii_case(n)))
        .collect())
}
