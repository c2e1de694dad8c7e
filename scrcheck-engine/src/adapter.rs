//! Text adapter
//!
//! Builds check tokens from an in-memory [`ScrBook`] instead of source
//! files, so checks can run on a persisted document. Each token remembers
//! the paragraph, footnote paragraph or picture it came from and where in
//! that object's text it starts.

use crate::check::CheckParameters;
use crate::config::StyleSheet;
use crate::document::{Footnote, Paragraph, Picture, Run, ScrBook, TextRun};
use scrcheck_core::{parse_verse_number, BcvRef, FieldId, TextType, Token, WritingSystemRegistry};
use std::sync::Arc;

const DEFAULT_SENTENCE_FINAL: &str = ".?!";
const DEFAULT_VERSE_BRIDGE: &str = "-";
const RTL_MARK: char = '\u{200F}';
const CAPTION_STYLE: &str = "Caption";

/// Parameter values backed by the project's styles and writing systems.
#[derive(Debug, Clone)]
pub struct ProjectParameters {
    registry: Arc<WritingSystemRegistry>,
    styles: StyleSheet,
}

impl ProjectParameters {
    pub fn new(registry: Arc<WritingSystemRegistry>, styles: StyleSheet) -> Self {
        Self { registry, styles }
    }

    pub fn registry(&self) -> &WritingSystemRegistry {
        &self.registry
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }
}

impl CheckParameters for ProjectParameters {
    fn parameter_value(&self, name: &str) -> String {
        let vernacular = self.registry.get(self.registry.vernacular());
        match name {
            "SentenceInitialStyles" => self.styles.sentence_initial.join("\n"),
            "TitleStyles" => self.styles.title.join("\n"),
            "HeadingStyles" => self.styles.heading.join("\n"),
            "ListStyles" => self.styles.list.join("\n"),
            "TableStyles" => self.styles.table.join("\n"),
            "SpecialStyles" => self.styles.special.join("\n"),
            "ChapterNumberStyle" => self.styles.chapter_number.clone(),
            "VerseNumberStyle" => self.styles.verse_number.clone(),
            "SentenceFinalPunctuation" => vernacular
                .and_then(|ws| ws.sentence_final_punctuation.clone())
                .unwrap_or_else(|| DEFAULT_SENTENCE_FINAL.to_string()),
            "VerseBridge" => {
                let bridge = vernacular
                    .and_then(|ws| ws.verse_bridge.as_deref())
                    .unwrap_or(DEFAULT_VERSE_BRIDGE);
                if self.registry.is_right_to_left(self.registry.vernacular()) {
                    format!("{RTL_MARK}{bridge}{RTL_MARK}")
                } else {
                    bridge.to_string()
                }
            }
            _ => String::new(),
        }
    }
}

/// Produces tokens from a [`ScrBook`].
#[derive(Debug, Clone)]
pub struct TextAdapter {
    params: ProjectParameters,
}

impl TextAdapter {
    pub fn new(registry: Arc<WritingSystemRegistry>, styles: StyleSheet) -> Self {
        Self {
            params: ProjectParameters::new(registry, styles),
        }
    }

    pub fn parameters(&self) -> &ProjectParameters {
        &self.params
    }

    /// Tokens of one chapter of `book`; chapter 0 means the whole book,
    /// titles and introduction included.
    pub fn tokens(&self, book: &ScrBook, chapter: u16) -> Vec<Token> {
        let mut walk = Walk {
            params: &self.params,
            current: BcvRef::book_start(book.book),
            end: BcvRef::book_start(book.book),
            tokens: Vec::new(),
        };

        for paragraph in &book.title {
            walk.paragraph(paragraph, false);
        }

        let mut in_scripture = false;
        for section in &book.sections {
            if !section.is_intro && !in_scripture {
                in_scripture = true;
                if walk.current.chapter == 0 {
                    walk.set_ref(BcvRef::new(book.book, 1, 1));
                }
            }
            // headings carry the reference their content starts at
            let heading_at = walk.tokens.len();
            for paragraph in &section.content {
                walk.paragraph(paragraph, in_scripture);
            }
            let content_start = walk.tokens.get(heading_at).map(|t| t.start_ref);
            let mut heading = Walk {
                params: &self.params,
                current: content_start.unwrap_or(walk.current),
                end: content_start.unwrap_or(walk.end),
                tokens: Vec::new(),
            };
            for paragraph in &section.heading {
                heading.paragraph(paragraph, false);
            }
            walk.tokens.splice(heading_at..heading_at, heading.tokens);
        }

        let mut tokens = walk.tokens;
        if chapter != 0 {
            tokens.retain(|t| t.start_ref.chapter == chapter);
        }
        log::debug!(
            "book {} chapter {chapter}: {} token(s)",
            book.book,
            tokens.len()
        );
        tokens
    }
}

impl CheckParameters for TextAdapter {
    fn parameter_value(&self, name: &str) -> String {
        self.params.parameter_value(name)
    }
}

/// Reference state while walking a book in order.
struct Walk<'a> {
    params: &'a ProjectParameters,
    current: BcvRef,
    end: BcvRef,
    tokens: Vec<Token>,
}

impl Walk<'_> {
    fn set_ref(&mut self, reference: BcvRef) {
        self.current = reference;
        self.end = reference;
    }

    fn writing_system(&self, run: Option<&str>, paragraph: Option<&str>) -> String {
        run.or(paragraph)
            .unwrap_or_else(|| self.params.registry.vernacular())
            .to_string()
    }

    fn is_verse_text(&self, style: &str, scripture: bool) -> bool {
        let styles = &self.params.styles;
        scripture
            && self.current.chapter > 0
            && self.current.verse > 0
            && !styles.heading.iter().chain(&styles.title).any(|s| s == style)
    }

    fn paragraph(&mut self, paragraph: &Paragraph, scripture: bool) {
        let mut offset = 0;
        let mut first = true;
        for run in &paragraph.runs {
            match run {
                Run::Text(run) => {
                    let len = run.text.chars().count();
                    if len > 0 {
                        let mut token = self.text_run(run, paragraph, scripture);
                        token.offset_in_owner = offset;
                        token.is_paragraph_start = std::mem::take(&mut first);
                        self.tokens.push(token);
                    }
                    offset += len;
                }
                Run::Footnote(footnote) => {
                    offset += 1;
                    self.footnote(footnote);
                }
                Run::Picture(picture) => {
                    offset += 1;
                    self.picture(picture, paragraph);
                }
            }
        }
    }

    fn text_run(&mut self, run: &TextRun, paragraph: &Paragraph, scripture: bool) -> Token {
        let styles = &self.params.styles;
        let char_style = run.char_style.as_deref();
        let book = self.current.book;

        let text_type = if char_style == Some(styles.chapter_number.as_str()) {
            let digits: String = run.text.trim().chars().take_while(char::is_ascii_digit).collect();
            if let Ok(chapter) = digits.parse::<u16>() {
                // verse 1 is implied until a verse number says otherwise
                self.set_ref(BcvRef::new(book, chapter, 1));
            }
            TextType::ChapterNumber
        } else if char_style == Some(styles.verse_number.as_str()) {
            if let Some((number, _)) = parse_verse_number(&run.text) {
                let (start, end) = number.refs(book, self.current.chapter, self.current);
                self.current = start;
                self.end = end;
            }
            TextType::VerseNumber
        } else if self.is_verse_text(&paragraph.style, scripture) {
            TextType::Verse
        } else {
            TextType::Other
        };

        let mut token = Token::new(run.text.clone(), self.current, paragraph.id);
        token.end_ref = self.end;
        token.text_type = text_type;
        token.paragraph_style = paragraph.style.clone();
        token.character_style = run.char_style.clone();
        token.locale = run.writing_system.clone();
        token.writing_system = self.writing_system(
            run.writing_system.as_deref(),
            paragraph.writing_system.as_deref(),
        );
        token
    }

    fn footnote(&mut self, footnote: &Footnote) {
        let mut note_start = true;
        for paragraph in &footnote.paragraphs {
            let mut offset = 0;
            let mut first = true;
            for run in &paragraph.runs {
                // nested anchors are not expected inside notes
                let Run::Text(run) = run else {
                    offset += 1;
                    continue;
                };
                let len = run.text.chars().count();
                if len > 0 {
                    let mut token = Token::new(run.text.clone(), self.current, paragraph.id);
                    token.end_ref = self.end;
                    token.text_type = TextType::Note;
                    token.paragraph_style = paragraph.style.clone();
                    token.character_style = run.char_style.clone();
                    token.locale = run.writing_system.clone();
                    token.writing_system = self.writing_system(
                        run.writing_system.as_deref(),
                        paragraph.writing_system.as_deref(),
                    );
                    token.offset_in_owner = offset;
                    token.is_paragraph_start = std::mem::take(&mut first);
                    token.is_note_start = std::mem::take(&mut note_start);
                    self.tokens.push(token);
                }
                offset += len;
            }
        }
    }

    fn picture(&mut self, picture: &Picture, paragraph: &Paragraph) {
        if picture.caption.is_empty() {
            return;
        }
        let mut token = Token::new(picture.caption.clone(), self.current, picture.id);
        token.end_ref = self.end;
        token.text_type = TextType::PictureCaption;
        token.paragraph_style = CAPTION_STYLE.to_string();
        token.field_id = FieldId::CAPTION;
        token.is_paragraph_start = true;
        token.locale = picture.writing_system.clone();
        token.writing_system = self.writing_system(
            picture.writing_system.as_deref(),
            paragraph.writing_system.as_deref(),
        );
        self.tokens.push(token);
    }
}
