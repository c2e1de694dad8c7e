//! Text domains
//!
//! A domain says which logical layer a piece of text belongs to. Domains
//! combine: a footnote inside a back translation is both `FOOTNOTE` and
//! `BACK_TRANS`, so matching is always done with [`MarkerDomain::contains`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign, Sub};

/// Combinable domain flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct MarkerDomain {
    bits: u8,
}

impl MarkerDomain {
    /// Vernacular scripture text; the empty set.
    pub const DEFAULT: Self = Self { bits: 0 };
    pub const BACK_TRANS: Self = Self { bits: 0b001 };
    pub const FOOTNOTE: Self = Self { bits: 0b010 };
    pub const NOTE: Self = Self { bits: 0b100 };

    const NAMED: [(Self, &'static str); 3] = [
        (Self::BACK_TRANS, "back_trans"),
        (Self::FOOTNOTE, "footnote"),
        (Self::NOTE, "note"),
    ];

    /// True if every flag of `other` is set in `self`.
    ///
    /// `DEFAULT` is contained in every domain.
    pub fn contains(&self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    pub fn is_default(&self) -> bool {
        self.bits == 0
    }

    /// Vernacular text, footnotes included. Back translations and
    /// annotations are not.
    pub fn is_vernacular(&self) -> bool {
        !self.contains(Self::BACK_TRANS) && !self.contains(Self::NOTE)
    }

    /// Mapping bucket used to key marker lookups.
    pub fn mapping_set(&self) -> MappingSet {
        if self.contains(Self::NOTE) {
            MappingSet::Notes
        } else {
            MappingSet::Main
        }
    }
}

impl BitOr for MarkerDomain {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            bits: self.bits | rhs.bits,
        }
    }
}

impl BitOrAssign for MarkerDomain {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits |= rhs.bits;
    }
}

impl Sub for MarkerDomain {
    type Output = Self;

    /// Removes the flags of `rhs`.
    fn sub(self, rhs: Self) -> Self {
        Self {
            bits: self.bits & !rhs.bits,
        }
    }
}

impl fmt::Display for MarkerDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            return write!(f, "default");
        }
        let names: Vec<&str> = Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join("+"))
    }
}

impl TryFrom<Vec<String>> for MarkerDomain {
    type Error = String;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        let mut domain = Self::DEFAULT;
        for name in names {
            if name == "default" {
                continue;
            }
            let flag = Self::NAMED
                .iter()
                .find(|(_, n)| *n == name)
                .map(|(flag, _)| *flag)
                .ok_or_else(|| format!("unknown domain '{name}'"))?;
            domain |= flag;
        }
        Ok(domain)
    }
}

impl From<MarkerDomain> for Vec<String> {
    fn from(domain: MarkerDomain) -> Self {
        MarkerDomain::NAMED
            .iter()
            .filter(|(flag, _)| domain.contains(*flag))
            .map(|(_, name)| name.to_string())
            .collect()
    }
}

/// Bucket a marker mapping is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSet {
    #[default]
    Main,
    Notes,
}

/// Kind of annotation an annotations file contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    #[default]
    None,
    Translator,
    Consultant,
}

/// Domain of a whole source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDomain {
    /// Vernacular scripture
    Main,
    /// Back translation into `locale` (the analysis default when `None`)
    BackTrans { locale: Option<String> },
    /// Annotations in `locale` of the given note type
    Annotations {
        locale: Option<String>,
        note_type: NoteType,
    },
}

impl SourceDomain {
    /// Flags every segment from this file starts with.
    pub fn base_domain(&self) -> MarkerDomain {
        match self {
            SourceDomain::Main => MarkerDomain::DEFAULT,
            SourceDomain::BackTrans { .. } => MarkerDomain::BACK_TRANS,
            SourceDomain::Annotations { .. } => MarkerDomain::NOTE,
        }
    }

    /// Note type of an annotations file; `None` for every other domain.
    pub fn note_type(&self) -> NoteType {
        match self {
            SourceDomain::Annotations { note_type, .. } => *note_type,
            _ => NoteType::None,
        }
    }

    pub fn locale(&self) -> Option<&str> {
        match self {
            SourceDomain::Main => None,
            SourceDomain::BackTrans { locale } | SourceDomain::Annotations { locale, .. } => {
                locale.as_deref()
            }
        }
    }
}
