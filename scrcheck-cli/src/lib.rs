//! scrcheck CLI library
//!
//! Command-line front end over `scrcheck-engine`: runs checks over source
//! files, keeps the annotation store up to date and reports run history.

pub mod commands;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
