//! Text segments produced by the tokenizer

use crate::domain::{MarkerDomain, NoteType};
use crate::reference::{BcvRef, RefRange};
use serde::{Deserialize, Serialize};

/// One marker together with the text it governs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    /// Marker as found in the source, e.g. `\p` or `\f*`
    pub marker: String,
    pub text: String,
    pub first_ref: BcvRef,
    pub last_ref: BcvRef,
    /// Verse number exactly as written, for `\v` segments
    pub literal_verse: Option<String>,
    /// 1-based line of the marker in its file
    pub line_number: usize,
    pub domain: MarkerDomain,
    pub writing_system: Option<String>,
    /// Kind of annotation, for text from annotation files or note markers
    #[serde(default)]
    pub note_type: NoteType,
}

impl TextSegment {
    /// References covered by this segment.
    pub fn range(&self) -> RefRange {
        RefRange::between(self.first_ref, self.last_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
