//! Canonical scripture references
//!
//! A [`BcvRef`] addresses text by book, chapter, verse and sub-verse segment,
//! independent of any paragraph structure. References are totally ordered in
//! that field order and pack losslessly into a single `u64`.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SIL three-letter codes of the 66 canonical books, in canonical order.
pub const BOOK_CODES: [&str; 66] = [
    "GEN", "EXO", "LEV", "NUM", "DEU", "JOS", "JDG", "RUT", "1SA", "2SA", "1KI", "2KI", "1CH",
    "2CH", "EZR", "NEH", "EST", "JOB", "PSA", "PRO", "ECC", "SNG", "ISA", "JER", "LAM", "EZK",
    "DAN", "HOS", "JOL", "AMO", "OBA", "JON", "MIC", "NAM", "HAB", "ZEP", "HAG", "ZEC", "MAL",
    "MAT", "MRK", "LUK", "JHN", "ACT", "ROM", "1CO", "2CO", "GAL", "EPH", "PHP", "COL", "1TH",
    "2TH", "1TI", "2TI", "TIT", "PHM", "HEB", "JAS", "1PE", "2PE", "1JN", "2JN", "3JN", "JUD",
    "REV",
];

/// Canonical book number (1-based) for a book code, case-insensitive.
pub fn book_number(code: &str) -> Option<u8> {
    BOOK_CODES
        .iter()
        .position(|c| c.eq_ignore_ascii_case(code))
        .map(|i| (i + 1) as u8)
}

/// Book code for a canonical book number.
pub fn book_code(book: u8) -> Option<&'static str> {
    BOOK_CODES.get(usize::from(book).checked_sub(1)?).copied()
}

/// Book/chapter/verse/segment address.
///
/// `chapter == 0` is front matter (titles, introduction); `verse == 0` is a
/// heading or title preceding the first verse of a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct BcvRef {
    pub book: u8,
    pub chapter: u16,
    pub verse: u16,
    pub segment: u16,
}

impl BcvRef {
    /// Creates a reference without a segment.
    pub const fn new(book: u8, chapter: u16, verse: u16) -> Self {
        Self {
            book,
            chapter,
            verse,
            segment: 0,
        }
    }

    /// Creates a reference to a sub-verse segment.
    pub const fn with_segment(book: u8, chapter: u16, verse: u16, segment: u16) -> Self {
        Self {
            book,
            chapter,
            verse,
            segment,
        }
    }

    /// First addressable position of a book.
    pub const fn book_start(book: u8) -> Self {
        Self::new(book, 0, 0)
    }

    /// Last addressable position of a book.
    pub const fn book_end(book: u8) -> Self {
        Self::with_segment(book, u16::MAX, u16::MAX, u16::MAX)
    }

    /// Packs the reference into one integer preserving order.
    pub fn packed(&self) -> u64 {
        (u64::from(self.book) << 48)
            | (u64::from(self.chapter) << 32)
            | (u64::from(self.verse) << 16)
            | u64::from(self.segment)
    }

    /// Inverse of [`BcvRef::packed`].
    pub fn from_packed(value: u64) -> Result<Self> {
        let book = value >> 48;
        if book > u64::from(u8::MAX) {
            return Err(CoreError::InvalidReference(format!(
                "packed value {value:#x} has book {book}"
            )));
        }
        Ok(Self {
            book: book as u8,
            chapter: (value >> 32) as u16,
            verse: (value >> 16) as u16,
            segment: value as u16,
        })
    }

    /// Same book, chapter and verse, ignoring segment.
    pub fn same_verse(&self, other: &BcvRef) -> bool {
        self.book == other.book && self.chapter == other.chapter && self.verse == other.verse
    }

    pub fn is_front_matter(&self) -> bool {
        self.chapter == 0
    }
}

impl fmt::Display for BcvRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match book_code(self.book) {
            Some(code) => write!(f, "{code}")?,
            None => write!(f, "#{}", self.book)?,
        }
        write!(f, " {}:{}", self.chapter, self.verse)?;
        if self.segment > 0 {
            write!(f, "/{}", self.segment)?;
        }
        Ok(())
    }
}

impl FromStr for BcvRef {
    type Err = CoreError;

    /// Parses `GEN`, `GEN 3` or `GEN 3:16`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (code, rest) = match s.split_once(char::is_whitespace) {
            Some((code, rest)) => (code, rest.trim()),
            None => (s, ""),
        };
        let book = book_number(code)
            .ok_or_else(|| CoreError::InvalidReference(format!("unknown book code '{code}'")))?;
        if rest.is_empty() {
            return Ok(Self::book_start(book));
        }
        let parse = |part: &str| {
            part.parse::<u16>()
                .map_err(|_| CoreError::InvalidReference(format!("bad number '{part}' in '{s}'")))
        };
        match rest.split_once(':') {
            Some((chapter, verse)) => Ok(Self::new(book, parse(chapter)?, parse(verse)?)),
            None => Ok(Self::new(book, parse(rest)?, 0)),
        }
    }
}

/// Inclusive range of references; `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefRange {
    start: BcvRef,
    end: BcvRef,
}

impl RefRange {
    /// Creates a range, rejecting reversed bounds.
    pub fn new(start: BcvRef, end: BcvRef) -> Result<Self> {
        if start > end {
            return Err(CoreError::InvalidReference(format!(
                "range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Single-reference range.
    pub fn single(reference: BcvRef) -> Self {
        Self {
            start: reference,
            end: reference,
        }
    }

    /// Range between two references given in either order.
    pub fn between(a: BcvRef, b: BcvRef) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Every position of one book.
    pub fn whole_book(book: u8) -> Self {
        Self {
            start: BcvRef::book_start(book),
            end: BcvRef::book_end(book),
        }
    }

    /// Every position of one chapter, including its verse-0 heading.
    pub fn chapter(book: u8, chapter: u16) -> Self {
        Self {
            start: BcvRef::new(book, chapter, 0),
            end: BcvRef::with_segment(book, chapter, u16::MAX, u16::MAX),
        }
    }

    /// Smallest range covering all references, in any order.
    ///
    /// Sections may hold a recap verse that is lower than the verses before
    /// it; the extent is still min..max.
    pub fn spanning<I: IntoIterator<Item = BcvRef>>(refs: I) -> Option<Self> {
        let mut iter = refs.into_iter();
        let first = iter.next()?;
        let mut range = Self::single(first);
        for r in iter {
            range.widen_to(r);
        }
        Some(range)
    }

    pub fn start(&self) -> BcvRef {
        self.start
    }

    pub fn end(&self) -> BcvRef {
        self.end
    }

    /// Grows the range so that it contains `reference`.
    pub fn widen_to(&mut self, reference: BcvRef) {
        if reference < self.start {
            self.start = reference;
        }
        if reference > self.end {
            self.end = reference;
        }
    }

    pub fn contains(&self, reference: &BcvRef) -> bool {
        self.start <= *reference && *reference <= self.end
    }

    pub fn contains_range(&self, other: &RefRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &RefRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True when the range spans more than one verse (e.g. "2-3").
    pub fn is_bridge(&self) -> bool {
        !self.start.same_verse(&self.end)
    }
}

impl fmt::Display for RefRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else if self.start.book == self.end.book && self.start.chapter == self.end.chapter {
            write!(f, "{}-{}", self.start, self.end.verse)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}
