//! Annotation store
//!
//! One [`BookAnnotations`] per book, persisted as pretty-printed JSON files
//! named `<BOOK>.annotations.json` in a store directory.

use crate::annotation::BookAnnotations;
use crate::error::{EngineError, Result};
use scrcheck_core::{book_code, book_number};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const FILE_SUFFIX: &str = ".annotations.json";

/// File name of a book's annotations, e.g. `MAT.annotations.json`.
pub fn annotation_file_name(book: u8) -> Option<String> {
    book_code(book).map(|code| format!("{code}{FILE_SUFFIX}"))
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    books: BTreeMap<u8, BookAnnotations>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(&self, book: u8) -> Option<&BookAnnotations> {
        self.books.get(&book)
    }

    /// Annotations of `book`, created empty on first use.
    pub fn book_mut(&mut self, book: u8) -> &mut BookAnnotations {
        self.books
            .entry(book)
            .or_insert_with(|| BookAnnotations::new(book))
    }

    pub fn books(&self) -> impl Iterator<Item = &BookAnnotations> {
        self.books.values()
    }

    /// Loads every annotation file in `dir`. A missing directory is an
    /// empty store.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();
        if !dir.exists() {
            log::debug!("store {} does not exist yet", dir.display());
            return Ok(store);
        }
        let entries = fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| EngineError::io(dir, e))?.path();
            let Some(code) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(FILE_SUFFIX))
            else {
                continue;
            };
            let Some(book) = book_number(code) else {
                log::warn!("ignoring {}: unknown book code", path.display());
                continue;
            };
            let content = fs::read_to_string(&path).map_err(|e| EngineError::io(&path, e))?;
            let annotations: BookAnnotations =
                serde_json::from_str(&content).map_err(|source| EngineError::Json {
                    path: path.clone(),
                    source,
                })?;
            if annotations.book != book {
                return Err(EngineError::Config(format!(
                    "{} holds annotations of book {}",
                    path.display(),
                    annotations.book
                )));
            }
            store.books.insert(book, annotations);
        }
        log::info!("loaded {} book(s) from {}", store.books.len(), dir.display());
        Ok(store)
    }

    /// Writes every non-empty book to `dir`, creating it if needed.
    pub fn save_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|e| EngineError::io(dir, e))?;
        let mut written = Vec::new();
        for annotations in self.books.values().filter(|b| !b.is_empty()) {
            let Some(name) = annotation_file_name(annotations.book) else {
                continue;
            };
            let path = dir.join(name);
            let json = serde_json::to_string_pretty(annotations).map_err(|source| {
                EngineError::Json {
                    path: path.clone(),
                    source,
                }
            })?;
            // write then rename so a crash never leaves half a file
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, json).map_err(|e| EngineError::io(&tmp, e))?;
            fs::rename(&tmp, &path).map_err(|e| EngineError::io(&path, e))?;
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotationSource, ErrorKey, ErrorPayload, ResolutionStatus};
    use crate::check::CheckId;
    use crate::history::record_run;
    use scrcheck_core::{BcvRef, FieldId, ObjectId};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut store = AnnotationStore::new();
        let check = CheckId::from_u128(9);
        let book = store.book_mut(40);
        let seq = book.insert(
            ErrorKey {
                check_id: check,
                begin_ref: BcvRef::new(40, 1, 1),
                end_ref: BcvRef::new(40, 1, 1),
                field_id: FieldId::CONTENTS,
                overflow_of: None,
            },
            ErrorPayload {
                begin_object: ObjectId(3),
                end_object: ObjectId(3),
                begin_offset: 2,
                end_offset: 5,
                writing_system: "xkal".to_string(),
                quoted_text: "abc".to_string(),
                message: "m".to_string(),
            },
            ResolutionStatus::Open,
            vec!["Test".to_string()],
            AnnotationSource::Automated,
        );
        book.set_status(seq, ResolutionStatus::Closed);
        record_run(book, check, "Test");
        store.book_mut(1);

        let written = store.save_dir(dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join("MAT.annotations.json")]);

        let loaded = AnnotationStore::load_dir(dir.path()).unwrap();
        assert_eq!(loaded.book(40), store.book(40));
        assert!(loaded.book(1).is_none());
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = AnnotationStore::load_dir(&dir.path().join("nope")).unwrap();
        assert_eq!(store.books().count(), 0);
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("GEN.annotations.json"), "{ not json").unwrap();
        assert!(matches!(
            AnnotationStore::load_dir(dir.path()),
            Err(EngineError::Json { .. })
        ));
    }
}
