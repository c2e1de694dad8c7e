//! Source files and import settings

use crate::domain::SourceDomain;
use crate::encoding::decode_source;
use crate::error::{CoreError, Result};
use crate::mapping::{ImportKind, MarkerMappingTable};
use crate::reference::{book_number, BcvRef, RefRange};
use crate::writing_system::WritingSystemRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One source file together with the references it is known to cover.
///
/// The window is fixed at configuration time; the tokenizer uses it to
/// decide whether the file has to be opened at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub domain: SourceDomain,
    pub window: RefRange,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, domain: SourceDomain, window: RefRange) -> Self {
        Self {
            path: path.into(),
            domain,
            window,
        }
    }

    /// Reads `path` once to find its book and chapter span.
    ///
    /// The window runs from the first `\c` to the end of the last one. If
    /// verse text precedes the first `\c` (a file continuing a chapter
    /// begun in another file) the window starts at the beginning of the book.
    pub fn scan(path: impl AsRef<Path>, domain: SourceDomain) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = decode_source(&bytes);

        let mut book = None;
        let mut first_chapter: Option<u16> = None;
        let mut last_chapter = 0u16;
        let mut verse_before_chapter = false;
        for line in text.as_str().lines() {
            let mut words = line.split_whitespace();
            match words.next() {
                Some("\\id") => {
                    if book.is_none() {
                        book = words.next().and_then(book_number);
                    }
                }
                Some("\\c") => {
                    if let Some(chapter) = words.next().and_then(|w| w.parse::<u16>().ok()) {
                        first_chapter.get_or_insert(chapter);
                        last_chapter = last_chapter.max(chapter);
                    }
                }
                Some(word) if word == "\\v" || line.contains("\\v ") => {
                    if first_chapter.is_none() {
                        verse_before_chapter = true;
                    }
                }
                _ => {}
            }
        }

        let book = book.ok_or_else(|| {
            CoreError::Config(format!("{} has no recognizable \\id line", path.display()))
        })?;
        let start = match first_chapter {
            Some(chapter) if !verse_before_chapter => BcvRef::new(book, chapter, 0),
            _ => BcvRef::book_start(book),
        };
        let end = if first_chapter.is_some() {
            BcvRef::with_segment(book, last_chapter, u16::MAX, u16::MAX)
        } else {
            BcvRef::book_end(book)
        };
        log::debug!("scanned {}: {start} - {end}", path.display());
        Ok(Self::new(path, domain, RefRange::between(start, end)))
    }
}

/// Immutable configuration snapshot shared by tokenizers.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub kind: ImportKind,
    pub mappings: Arc<MarkerMappingTable>,
    pub registry: Arc<WritingSystemRegistry>,
    /// Files in reading order
    pub sources: Vec<SourceFile>,
}

impl ImportSettings {
    pub fn new(
        kind: ImportKind,
        mappings: Arc<MarkerMappingTable>,
        registry: Arc<WritingSystemRegistry>,
    ) -> Self {
        Self {
            kind,
            mappings,
            registry,
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: SourceFile) -> Self {
        self.sources.push(source);
        self
    }

    pub fn add_source(&mut self, source: SourceFile) {
        self.sources.push(source);
    }

    /// The same settings reading only vernacular (`Main`) files.
    pub fn vernacular(&self) -> Self {
        Self {
            kind: self.kind,
            mappings: Arc::clone(&self.mappings),
            registry: Arc::clone(&self.registry),
            sources: self
                .sources
                .iter()
                .filter(|source| source.domain == SourceDomain::Main)
                .cloned()
                .collect(),
        }
    }

    /// Books covered by the configured files, in first-seen order.
    pub fn books(&self) -> Vec<u8> {
        let mut books = Vec::new();
        for source in &self.sources {
            let book = source.window.start().book;
            if !books.contains(&book) {
                books.push(book);
            }
        }
        books
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_scan_chapter_span() {
        let file = write_temp("\\id MAT\n\\c 3\n\\p\n\\v 1 text\n\\c 4\n\\v 1 more\n");
        let source = SourceFile::scan(file.path(), SourceDomain::Main).unwrap();
        assert_eq!(source.window.start(), BcvRef::new(40, 3, 0));
        assert_eq!(source.window.end().chapter, 4);
    }

    #[test]
    fn test_scan_continuation_file_starts_at_book_start() {
        let file = write_temp("\\id MAT\n\\v 5 continued\n\\c 5\n\\v 1 text\n");
        let source = SourceFile::scan(file.path(), SourceDomain::Main).unwrap();
        assert_eq!(source.window.start(), BcvRef::book_start(40));
    }

    #[test]
    fn test_scan_without_id_fails() {
        let file = write_temp("\\c 1\n\\v 1 text\n");
        assert!(matches!(
            SourceFile::scan(file.path(), SourceDomain::Main),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_books_in_order() {
        let settings = ImportSettings::new(
            ImportKind::Paratext5,
            Arc::new(MarkerMappingTable::new()),
            Arc::new(WritingSystemRegistry::default()),
        )
        .with_source(SourceFile::new("a", SourceDomain::Main, RefRange::whole_book(2)))
        .with_source(SourceFile::new("b", SourceDomain::Main, RefRange::whole_book(1)))
        .with_source(SourceFile::new("c", SourceDomain::Main, RefRange::whole_book(2)));
        assert_eq!(settings.books(), vec![2, 1]);
    }

    #[test]
    fn test_vernacular_keeps_main_files() {
        let settings = ImportSettings::new(
            ImportKind::Paratext5,
            Arc::new(MarkerMappingTable::new()),
            Arc::new(WritingSystemRegistry::default()),
        )
        .with_source(SourceFile::new("main", SourceDomain::Main, RefRange::whole_book(40)))
        .with_source(SourceFile::new(
            "bt",
            SourceDomain::BackTrans { locale: None },
            RefRange::whole_book(40),
        ))
        .with_source(SourceFile::new(
            "notes",
            SourceDomain::Annotations {
                locale: None,
                note_type: crate::domain::NoteType::Translator,
            },
            RefRange::whole_book(41),
        ));
        let vernacular = settings.vernacular();
        assert_eq!(vernacular.sources.len(), 1);
        assert_eq!(vernacular.sources[0].path, PathBuf::from("main"));
        assert_eq!(vernacular.books(), vec![40]);
        assert_eq!(settings.sources.len(), 3);
    }
}
