//! Marker mapping table
//!
//! Maps a source marker to what it means: which domain its text belongs to,
//! whether it is an inline (paired) marker, which style or target it maps to,
//! and whether its text is excluded from checking. The same literal marker can
//! mean different things in scripture and in annotation files, so mappings are
//! keyed by `(marker, MappingSet)`.

use crate::domain::{MappingSet, MarkerDomain, NoteType};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const USFM_DEFAULT: &str = include_str!("../configs/markers/usfm.toml");

/// How backslashes in source data are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// Every backslash token is a marker, configured or not
    #[default]
    Paratext5,
    /// Only configured markers are markers; other backslashes are literal text
    Other,
}

/// What a marker's text turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Ordinary paragraph or character style
    #[default]
    Style,
    /// `\id` line carrying the book code
    BookId,
    ChapterNumber,
    VerseNumber,
    /// Picture caption
    Figure,
}

/// One configured marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerMapping {
    #[serde(rename = "begin")]
    pub begin_marker: String,
    #[serde(rename = "end", default)]
    pub end_marker: Option<String>,
    #[serde(default)]
    pub domain: MarkerDomain,
    #[serde(default)]
    pub inline: bool,
    #[serde(rename = "style", default)]
    pub style_name: String,
    #[serde(rename = "target", default)]
    pub target_type: TargetType,
    /// Writing system override for the marker's text
    #[serde(rename = "locale", default)]
    pub icu_locale: Option<String>,
    #[serde(rename = "excluded", default)]
    pub is_excluded: bool,
    #[serde(default)]
    pub note_type: NoteType,
}

impl MarkerMapping {
    /// Paragraph-level mapping for `marker` with the given style.
    pub fn paragraph(marker: &str, style: &str) -> Self {
        Self {
            begin_marker: marker.to_string(),
            end_marker: None,
            domain: MarkerDomain::DEFAULT,
            inline: false,
            style_name: style.to_string(),
            target_type: TargetType::Style,
            icu_locale: None,
            is_excluded: false,
            note_type: NoteType::None,
        }
    }

    /// Inline mapping closed by `end`.
    pub fn inline(marker: &str, end: &str, style: &str) -> Self {
        Self {
            end_marker: Some(end.to_string()),
            inline: true,
            ..Self::paragraph(marker, style)
        }
    }

    pub fn with_domain(mut self, domain: MarkerDomain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_target(mut self, target: TargetType) -> Self {
        self.target_type = target;
        self
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.icu_locale = Some(locale.to_string());
        self
    }

    pub fn excluded(mut self) -> Self {
        self.is_excluded = true;
        self
    }

    /// Bucket this mapping is stored in.
    pub fn mapping_set(&self) -> MappingSet {
        self.domain.mapping_set()
    }

    fn validate(&self) -> Result<()> {
        if !is_marker_like(&self.begin_marker) {
            return Err(CoreError::MalformedMapping(format!(
                "begin marker '{}' must start with a backslash",
                self.begin_marker
            )));
        }
        if let Some(end) = &self.end_marker {
            if !is_marker_like(end) {
                return Err(CoreError::MalformedMapping(format!(
                    "end marker '{end}' of '{}' must start with a backslash",
                    self.begin_marker
                )));
            }
            if !self.inline {
                return Err(CoreError::MalformedMapping(format!(
                    "'{}' has an end marker but is not inline",
                    self.begin_marker
                )));
            }
        }
        Ok(())
    }
}

fn is_marker_like(s: &str) -> bool {
    s.len() > 1 && s.starts_with('\\') && !s.contains(char::is_whitespace)
}

#[derive(Debug, Deserialize)]
struct MappingFile {
    #[serde(default)]
    markers: Vec<MarkerMapping>,
}

/// Immutable-after-build lookup table of marker mappings.
#[derive(Debug, Clone, Default)]
pub struct MarkerMappingTable {
    entries: HashMap<(String, MappingSet), MarkerMapping>,
    end_markers: HashMap<String, MappingSet>,
}

impl MarkerMappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `[[markers]]` TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let file: MappingFile = toml::from_str(toml_str)?;
        let mut table = Self::new();
        for mapping in file.markers {
            table.insert(mapping)?;
        }
        Ok(table)
    }

    /// The embedded USFM table.
    pub fn usfm_default() -> Result<Self> {
        Self::from_toml(USFM_DEFAULT)
    }

    /// Adds a mapping, rejecting a second mapping for the same key.
    pub fn insert(&mut self, mapping: MarkerMapping) -> Result<()> {
        mapping.validate()?;
        let set = mapping.mapping_set();
        let key = (mapping.begin_marker.clone(), set);
        if self.entries.contains_key(&key) {
            return Err(CoreError::MalformedMapping(format!(
                "marker '{}' mapped twice in {set:?} set",
                mapping.begin_marker
            )));
        }
        if let Some(end) = &mapping.end_marker {
            self.end_markers.insert(end.clone(), set);
        }
        self.entries.insert(key, mapping);
        Ok(())
    }

    /// Looks up a begin marker; the `Notes` set falls back to `Main`.
    pub fn lookup(&self, marker: &str, set: MappingSet) -> Option<&MarkerMapping> {
        self.entries
            .get(&(marker.to_string(), set))
            .or_else(|| match set {
                MappingSet::Notes => self.entries.get(&(marker.to_string(), MappingSet::Main)),
                MappingSet::Main => None,
            })
    }

    pub fn is_end_marker(&self, marker: &str) -> bool {
        self.end_markers.contains_key(marker)
    }

    /// True if `marker` is configured as a begin or end marker in any set.
    pub fn is_known(&self, marker: &str) -> bool {
        self.is_end_marker(marker)
            || self.lookup(marker, MappingSet::Main).is_some()
            || self.lookup(marker, MappingSet::Notes).is_some()
    }

    /// Mappings sorted by marker, for display.
    pub fn sorted(&self) -> Vec<&MarkerMapping> {
        let mut all: Vec<&MarkerMapping> = self.entries.values().collect();
        all.sort_by(|a, b| {
            a.begin_marker
                .cmp(&b.begin_marker)
                .then_with(|| a.domain.is_default().cmp(&b.domain.is_default()).reverse())
        });
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
