//! Segment to token conversion
//!
//! Lets checks run directly over source files. Every paragraph marker opens
//! a synthetic owner; footnotes get owners of their own and occupy one
//! character of the paragraph they are anchored in, as pictures do.
//! Back-translation and annotation text never becomes a token.

use crate::domain::MarkerDomain;
use crate::error::Result;
use crate::mapping::{MarkerMapping, MarkerMappingTable, TargetType};
use crate::reference::BcvRef;
use crate::segment::TextSegment;
use crate::token::{FieldId, ObjectId, TextType, Token};
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct Owner {
    id: ObjectId,
    style: String,
    offset: usize,
    pending_start: bool,
}

fn verse_text_type(reference: BcvRef) -> TextType {
    if reference.chapter > 0 && reference.verse > 0 {
        TextType::Verse
    } else {
        TextType::Other
    }
}

/// Adapts a segment stream into a token stream.
#[derive(Debug)]
pub struct SegmentTokens<I> {
    segments: I,
    mappings: Arc<MarkerMappingTable>,
    last_owner: u64,
    paragraph: Owner,
    note: Option<Owner>,
    queue: VecDeque<Token>,
    failed: bool,
}

impl<I> SegmentTokens<I>
where
    I: Iterator<Item = Result<TextSegment>>,
{
    pub fn new(segments: I, mappings: Arc<MarkerMappingTable>) -> Self {
        Self {
            segments,
            mappings,
            last_owner: 0,
            paragraph: Owner::default(),
            note: None,
            queue: VecDeque::new(),
            failed: false,
        }
    }

    fn allocate(&mut self) -> ObjectId {
        self.last_owner += 1;
        ObjectId(self.last_owner)
    }

    fn start_owner(&mut self, style: &str) -> Owner {
        Owner {
            id: self.allocate(),
            style: style.to_string(),
            offset: 0,
            pending_start: true,
        }
    }

    /// Places `token` in the paragraph or the open note and queues it.
    fn push(&mut self, mut token: Token, in_note: bool) {
        let owner = match (in_note, self.note.as_mut()) {
            (true, Some(note)) => note,
            _ => &mut self.paragraph,
        };
        token.owner = owner.id;
        token.offset_in_owner = owner.offset;
        token.paragraph_style = owner.style.clone();
        if owner.pending_start {
            if in_note {
                token.is_note_start = true;
            } else {
                token.is_paragraph_start = true;
            }
            owner.pending_start = false;
        }
        owner.offset += token.char_len();
        self.queue.push_back(token);
    }

    fn token(segment: &TextSegment, text: String, text_type: TextType) -> Token {
        let mut token = Token::new(text, segment.first_ref, ObjectId::default());
        token.end_ref = segment.last_ref;
        token.text_type = text_type;
        token.writing_system = segment.writing_system.clone().unwrap_or_default();
        token
    }

    fn convert(&mut self, segment: TextSegment) {
        if !segment.domain.is_vernacular() {
            return;
        }
        let mapping: Option<MarkerMapping> = self
            .mappings
            .lookup(&segment.marker, segment.domain.mapping_set())
            .cloned();
        let target = mapping.as_ref().map_or(TargetType::Style, |m| m.target_type);
        if target == TargetType::BookId {
            return;
        }
        let style = mapping.as_ref().map_or("", |m| m.style_name.as_str());
        let locale = mapping.as_ref().and_then(|m| m.icu_locale.clone());

        if segment.domain.contains(MarkerDomain::FOOTNOTE) {
            let opens_note = mapping
                .as_ref()
                .is_some_and(|m| m.end_marker.is_some() && m.domain.contains(MarkerDomain::FOOTNOTE));
            if opens_note || self.note.is_none() {
                self.paragraph.offset += 1;
                let note = self.start_owner(style);
                self.note = Some(note);
                if opens_note {
                    // the caller (`+`, `-`) is not note text
                    return;
                }
            }
            if !segment.text.is_empty() {
                let mut token = Self::token(&segment, segment.text.clone(), TextType::Note);
                token.character_style = mapping.as_ref().map(|m| m.style_name.clone());
                token.locale = locale;
                self.push(token, true);
            }
            return;
        }
        self.note = None;

        match target {
            TargetType::ChapterNumber => {
                self.paragraph = self.start_owner(style);
                let token = Self::token(&segment, segment.text.clone(), TextType::ChapterNumber);
                self.push(token, false);
            }
            TargetType::VerseNumber => {
                if let Some(literal) = &segment.literal_verse {
                    let mut token = Self::token(&segment, literal.clone(), TextType::VerseNumber);
                    token.character_style = Some(style.to_string());
                    self.push(token, false);
                }
                if !segment.text.is_empty() {
                    let text_type = verse_text_type(segment.first_ref);
                    let token = Self::token(&segment, segment.text.clone(), text_type);
                    self.push(token, false);
                }
            }
            TargetType::Figure => {
                self.paragraph.offset += 1;
                let mut token = Self::token(&segment, segment.text.clone(), TextType::PictureCaption);
                token.owner = self.allocate();
                token.field_id = FieldId::CAPTION;
                token.paragraph_style = style.to_string();
                token.locale = locale;
                self.queue.push_back(token);
            }
            TargetType::Style | TargetType::BookId => {
                let is_paragraph = mapping.as_ref().is_some_and(|m| !m.inline);
                if is_paragraph {
                    self.paragraph = self.start_owner(style);
                }
                if !segment.text.is_empty() {
                    let text_type = verse_text_type(segment.first_ref);
                    let mut token = Self::token(&segment, segment.text.clone(), text_type);
                    if !is_paragraph {
                        token.character_style = mapping.as_ref().map(|m| m.style_name.clone());
                    }
                    token.locale = locale;
                    self.push(token, false);
                }
            }
        }
    }
}

impl<I> Iterator for SegmentTokens<I>
where
    I: Iterator<Item = Result<TextSegment>>,
{
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.queue.pop_front() {
                return Some(Ok(token));
            }
            if self.failed {
                return None;
            }
            match self.segments.next()? {
                Ok(segment) => self.convert(segment),
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NoteType;
    use crate::error::CoreError;

    fn segment(marker: &str, text: &str, reference: BcvRef) -> TextSegment {
        TextSegment {
            marker: marker.to_string(),
            text: text.to_string(),
            first_ref: reference,
            last_ref: reference,
            literal_verse: None,
            line_number: 1,
            domain: MarkerDomain::DEFAULT,
            writing_system: Some("xkal".to_string()),
            note_type: NoteType::None,
        }
    }

    fn verse(number: u16, text: &str) -> TextSegment {
        let mut seg = segment("\\v", text, BcvRef::new(40, 1, number));
        seg.literal_verse = Some(number.to_string());
        seg
    }

    fn footnote(marker: &str, text: &str) -> TextSegment {
        let mut seg = segment(marker, text, BcvRef::new(40, 1, 1));
        seg.domain = MarkerDomain::FOOTNOTE;
        seg
    }

    fn tokens(segments: Vec<TextSegment>) -> Vec<Token> {
        let table = Arc::new(MarkerMappingTable::usfm_default().unwrap());
        SegmentTokens::new(segments.into_iter().map(Ok), table)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_paragraph_and_verses() {
        let toks = tokens(vec![
            segment("\\id", "MAT", BcvRef::book_start(40)),
            segment("\\c", "1", BcvRef::new(40, 1, 0)),
            segment("\\p", "", BcvRef::new(40, 1, 0)),
            verse(1, "In the beginning"),
            verse(2, "Next"),
        ]);
        let kinds: Vec<(TextType, &str, bool)> = toks
            .iter()
            .map(|t| (t.text_type, t.text.as_str(), t.is_paragraph_start))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (TextType::ChapterNumber, "1", true),
                (TextType::VerseNumber, "1", true),
                (TextType::Verse, "In the beginning", false),
                (TextType::VerseNumber, "2", false),
                (TextType::Verse, "Next", false),
            ]
        );
        assert_ne!(toks[0].owner, toks[1].owner);
        assert_eq!(toks[1].owner, toks[4].owner);
        assert_eq!(toks[2].offset_in_owner, 1);
        assert_eq!(toks[3].offset_in_owner, 17);
        assert_eq!(toks[4].paragraph_style, "Paragraph");
    }

    #[test]
    fn test_footnote_gets_own_owner() {
        let toks = tokens(vec![
            segment("\\p", "", BcvRef::new(40, 1, 0)),
            verse(1, "Text"),
            footnote("\\f", "+ "),
            footnote("\\fr", "1.1 "),
            footnote("\\ft", "A note."),
            segment("\\f*", " after", BcvRef::new(40, 1, 1)),
        ]);
        let notes: Vec<&Token> = toks.iter().filter(|t| t.text_type == TextType::Note).collect();
        assert_eq!(notes.len(), 2);
        assert!(notes[0].is_note_start);
        assert!(!notes[1].is_note_start);
        assert_eq!(notes[1].offset_in_owner, 4);
        assert!(toks.iter().all(|t| t.text != "+ "));

        let after = toks.last().unwrap();
        assert_eq!(after.text, " after");
        assert_eq!(after.owner, toks[0].owner);
        // "1" + "Text" + anchor
        assert_eq!(after.offset_in_owner, 6);
    }

    #[test]
    fn test_back_translation_is_skipped() {
        let mut bt = segment("\\bt", "English the the text", BcvRef::new(40, 1, 1));
        bt.domain = MarkerDomain::BACK_TRANS;
        let mut bt_note = segment("\\btf", "note", BcvRef::new(40, 1, 1));
        bt_note.domain = MarkerDomain::BACK_TRANS | MarkerDomain::FOOTNOTE;
        let mut remark = segment("\\p", "A remark", BcvRef::new(40, 1, 1));
        remark.domain = MarkerDomain::NOTE;
        let toks = tokens(vec![
            segment("\\p", "", BcvRef::new(40, 1, 0)),
            verse(1, "Text."),
            bt,
            bt_note,
            remark,
            verse(2, "More."),
        ]);
        let texts: Vec<&str> = toks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "Text.", "2", "More."]);
        // the vernacular paragraph carries on across the skipped lines
        assert_eq!(toks[0].owner, toks[3].owner);
        assert_eq!(toks[3].offset_in_owner, 7);
    }

    #[test]
    fn test_error_is_passed_through() {
        let table = Arc::new(MarkerMappingTable::usfm_default().unwrap());
        let segments = vec![
            Ok(segment("\\p", "text", BcvRef::new(40, 1, 1))),
            Err(CoreError::Config("boom".to_string())),
            Ok(segment("\\p", "never", BcvRef::new(40, 1, 2))),
        ];
        let mut stream = SegmentTokens::new(segments.into_iter(), table);
        assert!(stream.next().unwrap().is_ok());
        assert!(stream.next().unwrap().is_err());
        assert!(stream.next().is_none());
    }
}
