//! Check tokens
//!
//! The unit every check consumes, whether it was produced from raw source
//! files or from a persisted document.

use crate::reference::BcvRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of text a token carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextType {
    Verse,
    ChapterNumber,
    VerseNumber,
    Note,
    PictureCaption,
    #[default]
    Other,
}

/// Opaque identity of the object (paragraph, footnote paragraph, picture)
/// a token's text lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Field of the owning object a token's text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u16);

impl FieldId {
    /// Paragraph contents
    pub const CONTENTS: Self = Self(1);
    /// Picture caption
    pub const CAPTION: Self = Self(2);
}

impl Default for FieldId {
    fn default() -> Self {
        Self::CONTENTS
    }
}

/// One token of checkable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub start_ref: BcvRef,
    pub end_ref: BcvRef,
    pub is_paragraph_start: bool,
    pub is_note_start: bool,
    pub text_type: TextType,
    pub paragraph_style: String,
    pub character_style: Option<String>,
    pub locale: Option<String>,
    pub owner: ObjectId,
    pub field_id: FieldId,
    pub writing_system: String,
    /// Char offset of `text` inside the owner's field
    pub offset_in_owner: usize,
}

impl Token {
    /// Token with default attributes, to be filled in by the producer.
    pub fn new(text: impl Into<String>, reference: BcvRef, owner: ObjectId) -> Self {
        Self {
            text: text.into(),
            start_ref: reference,
            end_ref: reference,
            is_paragraph_start: false,
            is_note_start: false,
            text_type: TextType::Other,
            paragraph_style: String::new(),
            character_style: None,
            locale: None,
            owner,
            field_id: FieldId::CONTENTS,
            writing_system: String::new(),
            offset_in_owner: 0,
        }
    }

    /// Length of `text` in chars, the unit offsets are counted in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Substring of `text` by char offset and length, clamped to the text.
    pub fn char_slice(&self, offset: usize, length: usize) -> String {
        self.text.chars().skip(offset).take(length).collect()
    }
}
