//! `--from` / `--to` reference arguments

use crate::error::CliError;
use anyhow::Result;
use scrcheck_core::{BcvRef, RefRange};

const FIRST_BOOK: u8 = 1;
const LAST_BOOK: u8 = 66;

/// Builds the checked range. A missing `from` starts at the first book, a
/// missing `to` ends with the last. `to` is inclusive at the precision it
/// was written in: `MAT` is the whole book, `MAT 5` all of chapter 5.
pub fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<RefRange> {
    let start = match from {
        Some(text) => parse_ref(text)?,
        None => BcvRef::book_start(FIRST_BOOK),
    };
    let end = match to {
        Some(text) => inclusive_end(text, parse_ref(text)?),
        None => BcvRef::book_end(LAST_BOOK),
    };
    RefRange::new(start, end)
        .map_err(|e| CliError::InvalidReference(e.to_string()).into())
}

fn parse_ref(text: &str) -> Result<BcvRef> {
    text.parse::<BcvRef>()
        .map_err(|e| CliError::InvalidReference(format!("{text}: {e}")).into())
}

fn inclusive_end(text: &str, parsed: BcvRef) -> BcvRef {
    let parts = text.split_whitespace().count();
    match (parts, text.contains(':')) {
        (1, _) => BcvRef::book_end(parsed.book),
        (_, false) => BcvRef::with_segment(parsed.book, parsed.chapter, u16::MAX, u16::MAX),
        _ => BcvRef::with_segment(parsed.book, parsed.chapter, parsed.verse, u16::MAX),
    }
}
