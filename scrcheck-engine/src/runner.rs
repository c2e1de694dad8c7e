//! Check runner
//!
//! Feeds one check a token stream, buffers what it reports, and only when
//! the stream ended cleanly reconciles the reports into the book's
//! annotations and records the run. A tokenizer fault aborts the run with
//! the annotations untouched.

use crate::annotation::BookAnnotations;
use crate::check::{ScriptureCheck, TextSubstring};
use crate::config::ProjectConfig;
use crate::error::{EngineError, Result};
use crate::history::{record_run, CheckRunResult};
use crate::reconcile::{ReconcileSummary, Reconciler, UNLIMITED};
use crate::store::AnnotationStore;
use scrcheck_core::{BcvRef, CoreError, ImportSettings, RefRange, Token, Tokenizer};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// What one (book, check) run did.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub book: u8,
    pub check_name: String,
    /// Reports the check made, before deduplication and capping
    pub reports: usize,
    pub summary: ReconcileSummary,
    pub result: CheckRunResult,
    pub elapsed: Duration,
}

/// Yields tokens until the first fault, which it keeps.
struct Guarded<I> {
    inner: I,
    error: Option<CoreError>,
}

impl<I> Iterator for Guarded<I>
where
    I: Iterator<Item = scrcheck_core::Result<Token>>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.error.is_some() {
            return None;
        }
        match self.inner.next()? {
            Ok(token) => Some(token),
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }
}

/// Runs checks and reconciles their reports.
#[derive(Debug, Clone)]
pub struct CheckRunner {
    caps: HashMap<String, i32>,
    default_cap: i32,
}

impl Default for CheckRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckRunner {
    /// Runner without caps.
    pub fn new() -> Self {
        Self {
            caps: HashMap::new(),
            default_cap: UNLIMITED,
        }
    }

    /// Runner using the caps of a project file.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let caps = config
            .checks
            .iter()
            .filter_map(|(name, c)| c.max_identical_errors.map(|cap| (name.clone(), cap)))
            .collect();
        Self {
            caps,
            default_cap: config.default_max_identical_errors,
        }
    }

    pub fn with_max_identical_errors(mut self, check_name: &str, cap: i32) -> Self {
        self.caps.insert(check_name.to_string(), cap);
        self
    }

    pub fn max_identical_errors(&self, check_name: &str) -> i32 {
        self.caps.get(check_name).copied().unwrap_or(self.default_cap)
    }

    /// Runs `check` over `tokens` and reconciles into `annotations`.
    ///
    /// `scope` bounds which existing records the run may remove; pass the
    /// whole book unless only part of it was tokenized.
    pub fn run_check<I>(
        &self,
        annotations: &mut BookAnnotations,
        check: &dyn ScriptureCheck,
        tokens: I,
        scope: RefRange,
    ) -> Result<RunOutcome>
    where
        I: IntoIterator<Item = scrcheck_core::Result<Token>>,
    {
        let started = Instant::now();
        let check_id = check.check_id();
        let mut guarded = Guarded {
            inner: tokens.into_iter(),
            error: None,
        };
        let mut reports: Vec<TextSubstring> = Vec::new();
        check.check(&mut guarded, &mut |report, reported_by| {
            if reported_by == check_id {
                reports.push(report);
            } else {
                log::warn!(
                    "{} reported under foreign check id {reported_by}; dropped",
                    check.name()
                );
            }
        });
        if let Some(err) = guarded.error {
            log::debug!("{}: run aborted, annotations untouched", check.name());
            return Err(EngineError::Core(err));
        }

        let summary = Reconciler::new(check_id, check.name(), annotations.book)
            .with_max_identical_errors(self.max_identical_errors(check.name()))
            .with_scope(scope)
            .reconcile(annotations, &reports);
        let result = record_run(annotations, check_id, check.name());
        log::info!(
            "book {}: {} found {} problem(s), {} created, {} removed",
            annotations.book,
            check.name(),
            reports.len(),
            summary.created,
            summary.removed
        );
        Ok(RunOutcome {
            book: annotations.book,
            check_name: check.name().to_string(),
            reports: reports.len(),
            summary,
            result,
            elapsed: started.elapsed(),
        })
    }

    /// Tokenizes the vernacular sources of `settings` once per book and
    /// check, and runs every check over the part of each book inside `range`.
    /// Back-translation and annotation files are not checked.
    pub fn run_sources(
        &self,
        settings: &ImportSettings,
        store: &mut AnnotationStore,
        checks: &[Box<dyn ScriptureCheck>],
        range: RefRange,
    ) -> Result<Vec<RunOutcome>> {
        let settings = &settings.vernacular();
        let mut outcomes = Vec::new();
        for book in settings.books() {
            let Some(scope) = book_scope(book, range) else {
                log::debug!("book {book} outside {range}; skipped");
                continue;
            };
            for check in checks {
                let tokens = Tokenizer::for_range(settings, scope).into_tokens();
                let outcome = self.run_check(store.book_mut(book), check.as_ref(), tokens, scope)?;
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }
}

/// Part of `range` that falls inside `book`, if any.
pub fn book_scope(book: u8, range: RefRange) -> Option<RefRange> {
    let whole = RefRange::whole_book(book);
    if !whole.overlaps(&range) {
        return None;
    }
    let start: BcvRef = range.start().max(whole.start());
    let end: BcvRef = range.end().min(whole.end());
    RefRange::new(start, end).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckId;
    use scrcheck_core::ObjectId;
    use std::path::PathBuf;

    struct EveryToken;

    impl ScriptureCheck for EveryToken {
        fn check_id(&self) -> CheckId {
            CheckId::from_u128(77)
        }

        fn name(&self) -> &str {
            "Every Token"
        }

        fn description(&self) -> &str {
            "Reports every token"
        }

        fn check(
            &self,
            tokens: &mut dyn Iterator<Item = Token>,
            record: &mut dyn FnMut(TextSubstring, CheckId),
        ) {
            for token in tokens {
                record(TextSubstring::new(&token, 0, 1, "seen"), self.check_id());
                record(TextSubstring::new(&token, 0, 1, "foreign"), CheckId::from_u128(78));
            }
        }
    }

    fn token(verse: u16) -> Token {
        Token::new("word", BcvRef::new(1, 1, verse), ObjectId(verse as u64))
    }

    #[test]
    fn test_run_records_history() {
        let mut book = BookAnnotations::new(1);
        let outcome = CheckRunner::new()
            .run_check(
                &mut book,
                &EveryToken,
                vec![Ok(token(1)), Ok(token(2))],
                RefRange::whole_book(1),
            )
            .unwrap();
        assert_eq!(outcome.reports, 2);
        assert_eq!(outcome.summary.created, 2);
        assert_eq!(outcome.result, CheckRunResult::Inconsistencies);
        assert_eq!(book.records().len(), 2);
        assert!(book.run_record(CheckId::from_u128(77)).is_some());
    }

    #[test]
    fn test_fault_leaves_annotations_untouched() {
        let mut book = BookAnnotations::new(1);
        let runner = CheckRunner::new();
        runner
            .run_check(&mut book, &EveryToken, vec![Ok(token(1))], RefRange::whole_book(1))
            .unwrap();
        let before = book.clone();

        let tokens = vec![
            Ok(token(2)),
            Err(CoreError::Io {
                path: PathBuf::from("gone.sfm"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            }),
            Ok(token(3)),
        ];
        let result = runner.run_check(&mut book, &EveryToken, tokens, RefRange::whole_book(1));
        assert!(matches!(result, Err(EngineError::Core(CoreError::Io { .. }))));
        assert_eq!(book, before);
    }

    #[test]
    fn test_book_scope() {
        let range = RefRange::between(BcvRef::new(1, 50, 1), BcvRef::new(2, 3, 0));
        assert_eq!(
            book_scope(1, range).unwrap().start(),
            BcvRef::new(1, 50, 1)
        );
        assert_eq!(book_scope(2, range).unwrap().end(), BcvRef::new(2, 3, 0));
        assert!(book_scope(3, range).is_none());
    }
}
