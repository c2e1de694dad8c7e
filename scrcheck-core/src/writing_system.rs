//! Writing-system registry
//!
//! The host application owns writing systems; this module only holds the
//! facts the tokenizer and checks need: direction, legacy encoding and a few
//! punctuation conventions.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One writing system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingSystem {
    pub id: String,
    #[serde(default)]
    pub right_to_left: bool,
    /// Encoding label of legacy (non-Unicode) data in this writing system
    #[serde(default)]
    pub legacy_encoding: Option<String>,
    #[serde(default)]
    pub sentence_final_punctuation: Option<String>,
    #[serde(default)]
    pub verse_bridge: Option<String>,
}

impl WritingSystem {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            right_to_left: false,
            legacy_encoding: None,
            sentence_final_punctuation: None,
            verse_bridge: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    vernacular: String,
    analysis: String,
    #[serde(default)]
    writing_systems: Vec<WritingSystem>,
}

/// Snapshot of the project's writing systems.
#[derive(Debug, Clone)]
pub struct WritingSystemRegistry {
    vernacular: String,
    analysis: String,
    systems: HashMap<String, WritingSystem>,
}

impl Default for WritingSystemRegistry {
    fn default() -> Self {
        Self::new("qaa", "en")
    }
}

impl WritingSystemRegistry {
    /// Registry with the given defaults and no further details.
    pub fn new(vernacular: &str, analysis: &str) -> Self {
        let mut systems = HashMap::new();
        for id in [vernacular, analysis] {
            systems.insert(id.to_string(), WritingSystem::new(id));
        }
        Self {
            vernacular: vernacular.to_string(),
            analysis: analysis.to_string(),
            systems,
        }
    }

    /// Parses `vernacular`, `analysis` and `[[writing_systems]]`.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(toml_str)?;
        Self::from_parts(file.vernacular, file.analysis, file.writing_systems)
    }

    /// Builds a registry; both defaults get an entry even if not listed.
    pub fn from_parts(
        vernacular: String,
        analysis: String,
        writing_systems: Vec<WritingSystem>,
    ) -> Result<Self> {
        let mut registry = Self::new(&vernacular, &analysis);
        for ws in writing_systems {
            if ws.id.trim().is_empty() {
                return Err(CoreError::Config("writing system with empty id".to_string()));
            }
            registry.systems.insert(ws.id.clone(), ws);
        }
        Ok(registry)
    }

    /// Adds or replaces a writing system.
    pub fn insert(&mut self, ws: WritingSystem) {
        self.systems.insert(ws.id.clone(), ws);
    }

    pub fn vernacular(&self) -> &str {
        &self.vernacular
    }

    pub fn analysis(&self) -> &str {
        &self.analysis
    }

    pub fn get(&self, id: &str) -> Option<&WritingSystem> {
        self.systems.get(id)
    }

    pub fn is_right_to_left(&self, id: &str) -> bool {
        self.get(id).is_some_and(|ws| ws.right_to_left)
    }
}
