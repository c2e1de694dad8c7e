//! Scripture references, marker configuration and the standard-format-marker
//! tokenizer
//!
//! This crate turns marked-up scripture source files into an ordered,
//! reference-tagged stream of [`TextSegment`]s and [`Token`]s that checks
//! can consume.
//!
//! # Architecture
//!
//! - **Reference model**: [`BcvRef`] and [`RefRange`]
//! - **Configuration**: [`MarkerMappingTable`] and [`WritingSystemRegistry`],
//!   passed around as immutable `Arc` snapshots
//! - **Tokenizer**: [`Tokenizer`], a lazy iterator over source files, and
//!   [`SegmentTokens`], which turns its segments into check tokens
//!
//! # Example
//!
//! ```rust
//! use scrcheck_core::{BcvRef, RefRange};
//!
//! let verse: BcvRef = "GEN 3:16".parse().unwrap();
//! let chapter = RefRange::chapter(verse.book, 3);
//! assert!(chapter.contains(&verse));
//! assert_eq!(BcvRef::from_packed(verse.packed()).unwrap(), verse);
//! ```

pub mod domain;
pub mod encoding;
pub mod error;
pub mod mapping;
pub mod reference;
pub mod segment;
pub mod token;
pub mod tokenizer;
pub mod tokens;
pub mod verse;
pub mod writing_system;

pub use domain::{MappingSet, MarkerDomain, NoteType, SourceDomain};
pub use encoding::{decode_source, EncodingResolver, SourceText};
pub use error::{CoreError, Result};
pub use mapping::{ImportKind, MarkerMapping, MarkerMappingTable, TargetType};
pub use reference::{book_code, book_number, BcvRef, RefRange, BOOK_CODES};
pub use segment::TextSegment;
pub use token::{FieldId, ObjectId, TextType, Token};
pub use tokenizer::{ImportSettings, SourceFile, Tokenizer};
pub use tokens::SegmentTokens;
pub use verse::{parse_verse_number, VerseNumber};
pub use writing_system::{WritingSystem, WritingSystemRegistry};
