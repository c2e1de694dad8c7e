//! Source file pattern resolution using glob

use crate::error::CliError;
use anyhow::{Context, Result};
use glob::glob;
use std::path::PathBuf;

/// Resolves file patterns to source files.
///
/// Files are read in the order given: patterns keep their command-line
/// order, matches of one pattern are sorted, and a file named twice is kept
/// at its first position. Chapters continuing across files depend on this.
pub fn resolve_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let mut matched = Vec::new();
        let paths = glob(pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))?;
        for path_result in paths {
            let path = path_result.with_context(|| format!("Error resolving pattern: {pattern}"))?;
            if path.is_file() {
                matched.push(path);
            }
        }
        matched.sort();
        for path in matched {
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        return Err(CliError::NoSourceFiles(patterns.join(" ")).into());
    }
    log::debug!("resolved {} source file(s)", files.len());
    Ok(files)
}
