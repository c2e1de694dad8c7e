//! Project configuration
//!
//! A project file gathers everything a host would otherwise supply: the
//! import kind and marker table, the writing systems, the style lists the
//! checks query, and per-check caps.
//!
//! ```toml
//! default_max_identical_errors = 50
//!
//! [import]
//! kind = "paratext5"
//! markers = "markers.toml"
//!
//! [writing_systems]
//! vernacular = "xkal"
//! analysis = "en"
//!
//! [[writing_systems.systems]]
//! id = "xkal"
//! legacy_encoding = "windows-1252"
//!
//! [checks."Repeated Words"]
//! max_identical_errors = 3
//! ```

use crate::error::{EngineError, Result};
use crate::reconcile::UNLIMITED;
use scrcheck_core::{ImportKind, MarkerMapping, MarkerMappingTable, WritingSystem, WritingSystemRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Whole project file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub writing_systems: WritingSystemsConfig,

    #[serde(default)]
    pub styles: StyleSheet,

    /// Per-check settings keyed by check name
    #[serde(default)]
    pub checks: BTreeMap<String, CheckConfig>,

    /// Cap for checks without their own; -1 is unlimited
    #[serde(default = "default_cap")]
    pub default_max_identical_errors: i32,
}

fn default_cap() -> i32 {
    UNLIMITED
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            import: ImportConfig::default(),
            writing_systems: WritingSystemsConfig::default(),
            styles: StyleSheet::default(),
            checks: BTreeMap::new(),
            default_max_identical_errors: UNLIMITED,
        }
    }
}

/// How source files are read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub kind: ImportKind,

    /// Marker table file, relative to the project file
    #[serde(default)]
    pub markers: Option<String>,

    /// Extra mappings layered over the table
    #[serde(default, rename = "marker")]
    pub extra_markers: Vec<MarkerMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingSystemsConfig {
    pub vernacular: String,
    pub analysis: String,
    #[serde(default)]
    pub systems: Vec<WritingSystem>,
}

impl Default for WritingSystemsConfig {
    fn default() -> Self {
        let registry = WritingSystemRegistry::default();
        Self {
            vernacular: registry.vernacular().to_string(),
            analysis: registry.analysis().to_string(),
            systems: Vec::new(),
        }
    }
}

/// Style names the adapter and checks need to know about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    pub chapter_number: String,
    pub verse_number: String,
    pub sentence_initial: Vec<String>,
    pub title: Vec<String>,
    pub heading: Vec<String>,
    pub list: Vec<String>,
    pub table: Vec<String>,
    pub special: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            chapter_number: "Chapter Number".to_string(),
            verse_number: "Verse Number".to_string(),
            sentence_initial: names(&["Paragraph", "Intro Paragraph", "Line1", "List Item1"]),
            title: names(&["Title Main", "Title Secondary"]),
            heading: names(&["Section Head", "Section Head Major", "Intro Section Head"]),
            list: names(&["List Item1", "List Item2"]),
            table: names(&["Table Row", "Table Cell"]),
            special: names(&["Caption", "Note General Paragraph"]),
        }
    }
}

/// Settings of one check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default)]
    pub max_identical_errors: Option<i32>,
}

impl ProjectConfig {
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: ProjectConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Self::from_toml(&content)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))
    }

    fn validate(&self) -> Result<()> {
        let caps = self
            .checks
            .iter()
            .filter_map(|(name, c)| c.max_identical_errors.map(|cap| (name.as_str(), cap)));
        for (name, cap) in std::iter::once(("default", self.default_max_identical_errors)).chain(caps) {
            if cap < UNLIMITED {
                return Err(EngineError::Config(format!(
                    "max_identical_errors for {name} must be -1 or more, got {cap}"
                )));
            }
        }
        Ok(())
    }

    /// Cap for the named check.
    pub fn max_identical_errors(&self, check_name: &str) -> i32 {
        self.checks
            .get(check_name)
            .and_then(|c| c.max_identical_errors)
            .unwrap_or(self.default_max_identical_errors)
    }

    pub fn registry(&self) -> Result<WritingSystemRegistry> {
        let ws = &self.writing_systems;
        Ok(WritingSystemRegistry::from_parts(
            ws.vernacular.clone(),
            ws.analysis.clone(),
            ws.systems.clone(),
        )?)
    }

    /// The configured marker table; `base_dir` resolves a relative markers
    /// file. Without one, the embedded USFM table is used.
    pub fn mapping_table(&self, base_dir: &Path) -> Result<MarkerMappingTable> {
        let mut table = match &self.import.markers {
            Some(file) => {
                let path = base_dir.join(file);
                let content = fs::read_to_string(&path).map_err(|e| EngineError::io(&path, e))?;
                MarkerMappingTable::from_toml(&content)?
            }
            None => MarkerMappingTable::usfm_default()?,
        };
        for mapping in &self.import.extra_markers {
            table.insert(mapping.clone())?;
        }
        log::debug!("marker table holds {} mappings", table.len());
        Ok(table)
    }
}
