//! List command implementation

use super::load_project;
use anyhow::{Context, Result};
use scrcheck_core::{MarkerMapping, TargetType, WritingSystemRegistry};
use scrcheck_engine::{builtin_checks, ProjectParameters, StyleSheet};
use std::path::Path;
use std::sync::Arc;

/// Prints the built-in checks in run order.
pub fn list_checks() -> Result<()> {
    let params = ProjectParameters::new(
        Arc::new(WritingSystemRegistry::default()),
        StyleSheet::default(),
    );
    println!("Available checks:");
    for check in builtin_checks(&params) {
        println!("  {:<28} {:<8} {}", check.name(), check.group(), check.check_id());
        println!("      {}", check.description());
    }
    Ok(())
}

/// Prints the marker table of `project`, or the built-in USFM table.
pub fn list_markers(project: Option<&Path>) -> Result<()> {
    let (config, base_dir) = load_project(project)?;
    let table = config
        .mapping_table(&base_dir)
        .context("Failed to load marker table")?;
    println!("{} marker(s):", table.len());
    for mapping in table.sorted() {
        println!("  {}", marker_line(mapping));
    }
    Ok(())
}

fn marker_line(mapping: &MarkerMapping) -> String {
    let mut flags = Vec::new();
    if mapping.inline {
        flags.push("inline".to_string());
    }
    if mapping.is_excluded {
        flags.push("excluded".to_string());
    }
    if mapping.target_type != TargetType::Style {
        flags.push(format!("{:?}", mapping.target_type));
    }
    if let Some(locale) = &mapping.icu_locale {
        flags.push(format!("ws={locale}"));
    }
    format!(
        "{:<8} {:<8} {:<28} {:<10} {}",
        mapping.begin_marker,
        mapping.end_marker.as_deref().unwrap_or("-"),
        mapping.style_name,
        mapping.domain.to_string(),
        flags.join(",")
    )
    .trim_end()
    .to_string()
}
