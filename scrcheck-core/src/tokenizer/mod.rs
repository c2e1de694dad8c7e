//! Standard-format-marker tokenizer
//!
//! [`Tokenizer`] streams an ordered list of source files through the marker
//! mapping table and yields [`TextSegment`]s for a reference window. It is a
//! plain pull-based iterator:
//!
//! - files are opened only when reached, and only if their declared window
//!   overlaps the request;
//! - each file is read, lexed and dropped before the next one is opened;
//! - chapter and verse state carries over between files of the same book
//!   and domain;
//! - faults (missing file, missing converter) come out of the `next()` call
//!   that hit them, after which the iterator is exhausted.
//!
//! ```rust,no_run
//! use scrcheck_core::{
//!     BcvRef, ImportKind, ImportSettings, MarkerMappingTable, SourceDomain, SourceFile,
//!     Tokenizer, WritingSystemRegistry,
//! };
//! use std::sync::Arc;
//!
//! let settings = ImportSettings::new(
//!     ImportKind::Paratext5,
//!     Arc::new(MarkerMappingTable::usfm_default()?),
//!     Arc::new(WritingSystemRegistry::default()),
//! )
//! .with_source(SourceFile::scan("41MAT.SFM", SourceDomain::Main)?);
//!
//! for segment in Tokenizer::new(&settings, BcvRef::new(40, 1, 1), BcvRef::new(40, 1, 25)) {
//!     let segment = segment?;
//!     println!("{} {} {}", segment.first_ref, segment.marker, segment.text);
//! }
//! # Ok::<(), scrcheck_core::CoreError>(())
//! ```

mod lexer;
mod source;

pub use source::{ImportSettings, SourceFile};

use crate::domain::{MappingSet, MarkerDomain, NoteType, SourceDomain};
use crate::encoding::{decode_source, EncodingResolver};
use crate::error::{CoreError, Result};
use crate::mapping::{ImportKind, MarkerMapping, MarkerMappingTable, TargetType};
use crate::reference::{book_number, BcvRef, RefRange};
use crate::segment::TextSegment;
use crate::tokens::SegmentTokens;
use crate::verse::parse_verse_number;
use lexer::{lex, Lexeme};
use smallvec::SmallVec;
use std::sync::Arc;

/// How a segment's refs are derived when it is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    Text,
    BookId,
    Chapter,
    Verse,
}

impl From<TargetType> for SegmentKind {
    fn from(target: TargetType) -> Self {
        match target {
            TargetType::BookId => SegmentKind::BookId,
            TargetType::ChapterNumber => SegmentKind::Chapter,
            TargetType::VerseNumber => SegmentKind::Verse,
            TargetType::Style | TargetType::Figure => SegmentKind::Text,
        }
    }
}

/// Segment still collecting text.
#[derive(Debug)]
struct Pending {
    marker: String,
    kind: SegmentKind,
    text: String,
    line: usize,
    domain: MarkerDomain,
    writing_system: String,
    note_type: NoteType,
    excluded: bool,
}

#[derive(Debug)]
struct OpenInline {
    end_marker: Option<String>,
    domain: MarkerDomain,
    locale: Option<String>,
    note_type: NoteType,
}

enum MarkerRole<'a> {
    Line(Option<&'a MarkerMapping>),
    Inline(Option<&'a MarkerMapping>),
    End,
}

/// Reference state shared across files.
#[derive(Debug, Default)]
struct RefState {
    current: BcvRef,
    domain: Option<SourceDomain>,
}

/// Configuration the tokenizer reads but never changes.
#[derive(Debug)]
struct Context {
    kind: ImportKind,
    mappings: Arc<MarkerMappingTable>,
    resolver: EncodingResolver,
}

impl Context {
    fn classify(&self, marker: &str, set: MappingSet, line_start: bool) -> MarkerRole<'_> {
        if self.mappings.is_end_marker(marker)
            || (self.kind == ImportKind::Paratext5 && marker.ends_with('*'))
        {
            return MarkerRole::End;
        }
        match self.mappings.lookup(marker, set) {
            Some(mapping) if mapping.inline => MarkerRole::Inline(Some(mapping)),
            Some(mapping) => MarkerRole::Line(Some(mapping)),
            None if line_start => MarkerRole::Line(None),
            None => MarkerRole::Inline(None),
        }
    }

    fn is_marker(&self, marker: &str, set: MappingSet, line_start: bool) -> bool {
        match self.kind {
            ImportKind::Paratext5 => true,
            ImportKind::Other => {
                self.mappings.is_end_marker(marker)
                    || self
                        .mappings
                        .lookup(marker, set)
                        .is_some_and(|m| m.inline || line_start)
            }
        }
    }

    /// Turns a pending segment into a yielded one, updating the reference
    /// state. Excluded segments yield nothing.
    fn finish(
        &self,
        pending: Pending,
        unicode: bool,
        state: &mut RefState,
    ) -> Result<Option<TextSegment>> {
        if pending.excluded {
            return Ok(None);
        }
        let text = if unicode {
            pending.text
        } else {
            self.resolver.convert(&pending.writing_system, &pending.text)?
        };

        let current = state.current;
        let mut literal_verse = None;
        let (first_ref, last_ref, text) = match pending.kind {
            SegmentKind::Text => (current, current, text),
            SegmentKind::BookId => {
                let book = text.split_whitespace().next().and_then(book_number);
                match book {
                    Some(book) if book != current.book => {
                        state.current = BcvRef::book_start(book);
                    }
                    Some(_) => {}
                    None => log::warn!("line {}: unrecognized book id '{text}'", pending.line),
                }
                (state.current, state.current, text)
            }
            SegmentKind::Chapter => {
                let literal = text.trim();
                let digits: String = literal.chars().take_while(|c| c.is_ascii_digit()).collect();
                match digits.parse::<u16>() {
                    Ok(chapter) => state.current = BcvRef::new(current.book, chapter, 0),
                    Err(_) => log::warn!("line {}: bad chapter number '{literal}'", pending.line),
                }
                (state.current, state.current, literal.to_string())
            }
            SegmentKind::Verse => {
                let parsed =
                    parse_verse_number(&text).map(|(number, rest)| (number, rest.to_string()));
                match parsed {
                    Some((number, rest)) => {
                        let (first, last) = number.refs(current.book, current.chapter, current);
                        state.current = last;
                        literal_verse = Some(number.literal);
                        (first, last, rest)
                    }
                    None => {
                        log::debug!("line {}: verse marker without number", pending.line);
                        (current, current, text)
                    }
                }
            }
        };

        Ok(Some(TextSegment {
            marker: pending.marker,
            text,
            first_ref,
            last_ref,
            literal_verse,
            line_number: pending.line,
            domain: pending.domain,
            writing_system: Some(pending.writing_system),
            note_type: pending.note_type,
        }))
    }
}

/// Lexing state of the file being read.
#[derive(Debug)]
struct FileCursor {
    source: SourceFile,
    unicode: bool,
    lexemes: std::vec::IntoIter<Lexeme>,
    pending: Option<Pending>,
    stack: SmallVec<[OpenInline; 4]>,
    line_domain: MarkerDomain,
    line_locale: Option<String>,
    line_note_type: NoteType,
    line_excluded: bool,
    /// End marker of an excluded inline marker being skipped
    skip_until: Option<String>,
}

impl FileCursor {
    fn open(source: SourceFile, ctx: &Context) -> Result<Self> {
        let bytes = std::fs::read(&source.path).map_err(|err| CoreError::Io {
            path: source.path.clone(),
            source: err,
        })?;
        let text = decode_source(&bytes);
        let set = source.domain.base_domain().mapping_set();
        let lexemes = lex(text.as_str(), |marker, line_start| {
            ctx.is_marker(marker, set, line_start)
        });
        log::debug!(
            "opened {} ({} lexemes, {})",
            source.path.display(),
            lexemes.len(),
            if text.is_unicode() { "unicode" } else { "legacy" }
        );
        Ok(Self {
            source,
            unicode: text.is_unicode(),
            lexemes: lexemes.into_iter(),
            pending: None,
            stack: SmallVec::new(),
            line_domain: MarkerDomain::DEFAULT,
            line_locale: None,
            line_note_type: NoteType::None,
            line_excluded: false,
            skip_until: None,
        })
    }

    fn mapping_set(&self) -> MappingSet {
        (self.source.domain.base_domain() | self.line_domain).mapping_set()
    }

    fn active_domain(&self) -> MarkerDomain {
        self.stack
            .iter()
            .fold(self.source.domain.base_domain() | self.line_domain, |acc, open| {
                acc | open.domain
            })
    }

    fn new_pending(
        &self,
        ctx: &Context,
        marker: String,
        line: usize,
        kind: SegmentKind,
        excluded: bool,
    ) -> Pending {
        let domain = self.active_domain();
        let locale = self
            .stack
            .iter()
            .rev()
            .find_map(|open| open.locale.as_deref())
            .or(self.line_locale.as_deref());
        let writing_system = ctx
            .resolver
            .writing_system_for(&self.source.domain, domain, locale);
        let note_type = self
            .stack
            .iter()
            .rev()
            .map(|open| open.note_type)
            .chain([self.line_note_type, self.source.domain.note_type()])
            .find(|note_type| *note_type != NoteType::None)
            .unwrap_or_default();
        Pending {
            marker,
            kind,
            text: String::new(),
            line,
            domain,
            writing_system,
            note_type,
            excluded,
        }
    }

    fn reset_line(&mut self, mapping: Option<&MarkerMapping>) {
        self.stack.clear();
        self.skip_until = None;
        self.line_domain = mapping.map_or(MarkerDomain::DEFAULT, |m| m.domain);
        self.line_locale = mapping.and_then(|m| m.icu_locale.clone());
        self.line_note_type = mapping.map_or(NoteType::None, |m| m.note_type);
        self.line_excluded = mapping.is_some_and(|m| m.is_excluded);
    }

    fn append_text(&mut self, ctx: &Context, text: &str, line: usize, continuation: bool) {
        if self.skip_until.is_some() {
            return;
        }
        if self.pending.is_none() {
            log::warn!(
                "{}:{line}: text before any marker",
                self.source.path.display()
            );
            let orphan = self.new_pending(ctx, String::new(), line, SegmentKind::Text, self.line_excluded);
            self.pending = Some(orphan);
        }
        if let Some(pending) = self.pending.as_mut() {
            if continuation && !pending.text.is_empty() {
                pending.text.push(' ');
            }
            pending.text.push_str(text);
        }
    }

    /// Starts the segment introduced by `marker`.
    fn open_marker(&mut self, ctx: &Context, marker: String, line: usize, line_start: bool) {
        let role = ctx.classify(&marker, self.mapping_set(), line_start);

        if self.skip_until.is_some() {
            let closes_skip = self.skip_until.as_deref() == Some(marker.as_str());
            match role {
                MarkerRole::End if closes_skip => self.skip_until = None,
                MarkerRole::Line(_) => {}
                _ => {
                    self.pending = None;
                    return;
                }
            }
        }

        match role {
            MarkerRole::Line(mapping) => {
                if mapping.is_none() {
                    log::warn!(
                        "{}:{line}: unknown marker {marker}",
                        self.source.path.display()
                    );
                }
                self.reset_line(mapping);
                let kind = mapping.map_or(SegmentKind::Text, |m| m.target_type.into());
                self.pending = Some(self.new_pending(ctx, marker, line, kind, self.line_excluded));
            }
            MarkerRole::Inline(mapping) => {
                if mapping.is_none() {
                    log::warn!(
                        "{}:{line}: unknown inline marker {marker}",
                        self.source.path.display()
                    );
                }
                // a line opening with an inline marker leaves a line-bound
                // domain or exclusion behind (e.g. `\rem` then `\v 2`)
                if line_start && (self.line_excluded || !self.line_domain.is_default()) {
                    self.reset_line(None);
                }
                if let Some(m) = mapping.filter(|m| m.is_excluded) {
                    match &m.end_marker {
                        Some(end) => {
                            self.skip_until = Some(end.clone());
                            self.pending = None;
                        }
                        None => {
                            self.pending =
                                Some(self.new_pending(ctx, marker, line, SegmentKind::Text, true));
                        }
                    }
                    return;
                }

                let target = mapping.map_or(TargetType::Style, |m| m.target_type);
                if !matches!(
                    target,
                    TargetType::VerseNumber | TargetType::ChapterNumber | TargetType::BookId
                ) {
                    let end_marker = mapping.and_then(|m| m.end_marker.clone());
                    if end_marker.is_none()
                        && self.stack.last().is_some_and(|top| top.end_marker.is_none())
                    {
                        self.stack.pop();
                    }
                    self.stack.push(OpenInline {
                        end_marker,
                        domain: mapping.map_or(MarkerDomain::DEFAULT, |m| m.domain),
                        locale: mapping.and_then(|m| m.icu_locale.clone()),
                        note_type: mapping.map_or(NoteType::None, |m| m.note_type),
                    });
                }
                self.pending =
                    Some(self.new_pending(ctx, marker, line, target.into(), self.line_excluded));
            }
            MarkerRole::End => {
                match self
                    .stack
                    .iter()
                    .rposition(|open| open.end_marker.as_deref() == Some(marker.as_str()))
                {
                    Some(pos) => self.stack.truncate(pos),
                    None => log::debug!(
                        "{}:{line}: unmatched end marker {marker}",
                        self.source.path.display()
                    ),
                }
                self.pending =
                    Some(self.new_pending(ctx, marker, line, SegmentKind::Text, self.line_excluded));
            }
        }
    }
}

/// Lazy segment stream over a set of source files and a reference window.
#[derive(Debug)]
pub struct Tokenizer {
    ctx: Context,
    window: RefRange,
    files: std::vec::IntoIter<SourceFile>,
    current: Option<FileCursor>,
    state: RefState,
    finished: bool,
}

impl Tokenizer {
    /// Tokenizer over `settings.sources` for `start..=end`.
    ///
    /// Nothing is opened here. A reversed window yields nothing.
    pub fn new(settings: &ImportSettings, start: BcvRef, end: BcvRef) -> Self {
        Self {
            ctx: Context {
                kind: settings.kind,
                mappings: Arc::clone(&settings.mappings),
                resolver: EncodingResolver::new(Arc::clone(&settings.registry)),
            },
            window: RefRange::between(start, end),
            files: settings.sources.clone().into_iter(),
            current: None,
            state: RefState::default(),
            finished: start > end,
        }
    }

    /// Tokenizer for a whole range.
    pub fn for_range(settings: &ImportSettings, range: RefRange) -> Self {
        Self::new(settings, range.start(), range.end())
    }

    /// Converts the segment stream into check tokens.
    pub fn into_tokens(self) -> SegmentTokens<Self> {
        let mappings = Arc::clone(&self.ctx.mappings);
        SegmentTokens::new(self, mappings)
    }

    fn open_next_file(&mut self) -> Result<Option<FileCursor>> {
        for source in self.files.by_ref() {
            if !source.window.overlaps(&self.window) {
                log::debug!("skipping {}: outside {}", source.path.display(), self.window);
                continue;
            }
            let book = source.window.start().book;
            let cursor = FileCursor::open(source, &self.ctx)?;
            let continues = self.state.current.book == book
                && self.state.domain.as_ref() == Some(&cursor.source.domain);
            if !continues {
                self.state.current = BcvRef::book_start(book);
            }
            self.state.domain = Some(cursor.source.domain.clone());
            return Ok(Some(cursor));
        }
        Ok(None)
    }

    /// Next finished segment of the current file, in or out of the window.
    fn step(&mut self) -> Result<Option<TextSegment>> {
        let Some(cursor) = self.current.as_mut() else {
            return Ok(None);
        };
        loop {
            let finished = match cursor.lexemes.next() {
                Some(Lexeme::Text {
                    text,
                    line,
                    continuation,
                }) => {
                    cursor.append_text(&self.ctx, &text, line, continuation);
                    continue;
                }
                Some(Lexeme::Marker {
                    marker,
                    line,
                    line_start,
                }) => {
                    let previous = cursor.pending.take();
                    cursor.open_marker(&self.ctx, marker, line, line_start);
                    previous
                }
                None => match cursor.pending.take() {
                    Some(pending) => Some(pending),
                    None => return Ok(None),
                },
            };
            if let Some(pending) = finished {
                if let Some(segment) = self.ctx.finish(pending, cursor.unicode, &mut self.state)? {
                    return Ok(Some(segment));
                }
            }
        }
    }
}

impl Iterator for Tokenizer {
    type Item = Result<TextSegment>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if self.current.is_none() {
                match self.open_next_file() {
                    Ok(Some(cursor)) => self.current = Some(cursor),
                    Ok(None) => {
                        self.finished = true;
                        return None;
                    }
                    Err(err) => {
                        self.finished = true;
                        return Some(Err(err));
                    }
                }
            }
            match self.step() {
                Ok(Some(segment)) => {
                    if segment.first_ref > self.window.end() {
                        // past the window: the rest of this file is too
                        self.current = None;
                        continue;
                    }
                    if segment.last_ref < self.window.start() {
                        continue;
                    }
                    return Some(Ok(segment));
                }
                Ok(None) => self.current = None,
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Tokenizer {}
