//! Check execution and annotation reconciliation for scrcheck
//!
//! Runs [`ScriptureCheck`]s over tokens produced either by the
//! `scrcheck-core` tokenizer or by the [`TextAdapter`], and keeps a
//! persistent, deduplicated set of annotations per book.
//!
//! # Architecture
//!
//! - **Checks**: the [`ScriptureCheck`] trait and the built-ins in [`checks`]
//! - **Runner**: [`CheckRunner`] buffers reports and hands them to the
//!   [`Reconciler`] once the token stream ended cleanly
//! - **Persistence**: [`BookAnnotations`] per book inside an
//!   [`AnnotationStore`], with run history per (book, check)
//!
//! # Example
//!
//! ```rust
//! use scrcheck_engine::{
//!     checks::RepeatedWordsCheck, BookAnnotations, CheckRunResult, CheckRunner,
//! };
//! use scrcheck_core::{BcvRef, ObjectId, RefRange, Token};
//!
//! let token = Token::new("in the the beginning", BcvRef::new(1, 1, 1), ObjectId(1));
//! let mut annotations = BookAnnotations::new(1);
//! let outcome = CheckRunner::new()
//!     .run_check(
//!         &mut annotations,
//!         &RepeatedWordsCheck::new(),
//!         vec![Ok(token)],
//!         RefRange::whole_book(1),
//!     )
//!     .unwrap();
//! assert_eq!(outcome.result, CheckRunResult::Inconsistencies);
//! assert_eq!(annotations.records()[0].payload.quoted_text, "the");
//! ```

pub mod adapter;
pub mod annotation;
pub mod check;
pub mod checks;
pub mod config;
pub mod document;
pub mod error;
pub mod history;
pub mod reconcile;
pub mod runner;
pub mod store;

pub use adapter::{ProjectParameters, TextAdapter};
pub use annotation::{
    AnnotationSource, BookAnnotations, ErrorKey, ErrorPayload, ErrorRecord, ResolutionStatus,
};
pub use check::{CheckId, CheckParameters, ScriptureCheck, TextSubstring};
pub use checks::{builtin_checks, find_check};
pub use config::{CheckConfig, ImportConfig, ProjectConfig, StyleSheet, WritingSystemsConfig};
pub use document::{Footnote, Paragraph, Picture, Run, ScrBook, ScrSection, TextRun};
pub use error::{EngineError, Result};
pub use history::{record_run, run_result, CheckRunRecord, CheckRunResult};
pub use reconcile::{ReconcileSummary, Reconciler, UNLIMITED};
pub use runner::{book_scope, CheckRunner, RunOutcome};
pub use store::{annotation_file_name, AnnotationStore};
