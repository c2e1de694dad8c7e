//! Verse number parsing
//!
//! Accepts `12`, `12a`, `2-3`, `2a-2b` and bridges written with U+2010 or
//! U+2011, with left-to-right/right-to-left marks anywhere in the number.
//! Whatever follows the longest valid number is returned untouched so that
//! stray punctuation re-enters the text stream.

use crate::reference::BcvRef;

const LRM: char = '\u{200E}';
const RLM: char = '\u{200F}';

fn is_direction_mark(ch: char) -> bool {
    ch == LRM || ch == RLM
}

fn is_bridge(ch: char) -> bool {
    matches!(ch, '-' | '\u{2010}' | '\u{2011}')
}

/// A parsed verse number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseNumber {
    pub first: u16,
    pub first_letter: Option<char>,
    pub last: u16,
    pub last_letter: Option<char>,
    /// The number exactly as written
    pub literal: String,
}

impl VerseNumber {
    pub fn is_bridge(&self) -> bool {
        self.first != self.last || self.first_letter != self.last_letter
    }

    /// References of the first and last verse, given the reference the
    /// tokenizer was at before this number.
    ///
    /// A sub-verse letter continues the segment count of the current verse
    /// (`1a`, `1c`, `1e` are segments 1, 2, 3); a bare number is segment 0.
    pub fn refs(&self, book: u8, chapter: u16, current: BcvRef) -> (BcvRef, BcvRef) {
        let continues_current =
            current.book == book && current.chapter == chapter && current.verse == self.first;
        let first_segment = match self.first_letter {
            None => 0,
            Some(_) if continues_current && current.segment > 0 => current.segment + 1,
            Some(_) => 1,
        };
        let last_segment = if self.last == self.first {
            match (self.last_letter, self.first_letter) {
                (Some(last), Some(first)) if last != first => first_segment + 1,
                _ => first_segment,
            }
        } else if self.last_letter.is_some() {
            1
        } else {
            0
        };
        (
            BcvRef::with_segment(book, chapter, self.first, first_segment),
            BcvRef::with_segment(book, chapter, self.last, last_segment),
        )
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_marks(&mut self) {
        while self.peek().is_some_and(is_direction_mark) {
            self.bump();
        }
    }

    fn number(&mut self) -> Option<u16> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if start == self.pos {
            return None;
        }
        self.text[start..self.pos].parse().ok()
    }

    /// A single lowercase letter not followed by another letter.
    fn letter(&mut self) -> Option<char> {
        let ch = self.peek().filter(|c| c.is_ascii_lowercase())?;
        let after = self.text[self.pos + ch.len_utf8()..].chars().next();
        if after.is_some_and(char::is_alphabetic) {
            return None;
        }
        self.bump();
        Some(ch)
    }
}

/// Parses a verse number at the start of `text`.
///
/// Returns the number and the remaining text with leading whitespace
/// removed, or `None` if `text` does not start with a number.
pub fn parse_verse_number(text: &str) -> Option<(VerseNumber, &str)> {
    let text = text.trim_start();
    let mut cursor = Cursor { text, pos: 0 };
    cursor.skip_marks();
    let first = cursor.number()?;
    let first_letter = cursor.letter();
    let mut end = cursor.pos;
    let mut last = first;
    let mut last_letter = first_letter;

    cursor.skip_marks();
    if cursor.peek().is_some_and(is_bridge) {
        cursor.bump();
        cursor.skip_marks();
        if let Some(n) = cursor.number() {
            let letter = cursor.letter();
            if n > first || (n == first && letter.is_some() && letter > first_letter) {
                last = n;
                last_letter = letter;
                cursor.skip_marks();
                end = cursor.pos;
            }
        }
    }

    let number = VerseNumber {
        first,
        first_letter,
        last,
        last_letter,
        literal: text[..end].to_string(),
    };
    Some((number, text[end..].trim_start()))
}
