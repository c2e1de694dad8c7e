//! CLI command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use scrcheck_engine::ProjectConfig;
use std::path::{Path, PathBuf};

pub mod check;
pub mod list;
pub mod status;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run checks over source files and update the annotation store
    Check(check::CheckArgs),

    /// Show run history and open/closed counts from the annotation store
    Status(status::StatusArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List the built-in checks
    Checks,

    /// List the active marker mapping table
    Markers {
        /// Project file whose marker table to show (default: built-in USFM)
        #[arg(short, long, value_name = "FILE")]
        project: Option<PathBuf>,
    },
}

impl Commands {
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Check(args) => args.execute(),
            Commands::Status(args) => args.execute(),
            Commands::List { subcommand } => match subcommand {
                ListCommands::Checks => list::list_checks(),
                ListCommands::Markers { project } => list::list_markers(project.as_deref()),
            },
        }
    }
}

/// Initialize logging based on verbosity level
pub(crate) fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    if !quiet {
        // a second init in the same process keeps the first logger
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .try_init();
    }
}

/// Loads the project file, or the defaults when none is given. Returns the
/// directory relative paths in the project resolve against.
pub(crate) fn load_project(path: Option<&Path>) -> Result<(ProjectConfig, PathBuf)> {
    match path {
        Some(path) => {
            let config = ProjectConfig::from_file(path)
                .with_context(|| format!("Failed to load project {}", path.display()))?;
            let base = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            log::info!("using project {}", path.display());
            Ok((config, base))
        }
        None => Ok((ProjectConfig::default(), PathBuf::from("."))),
    }
}
