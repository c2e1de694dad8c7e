//! Line-oriented marker lexer
//!
//! Splits one file into marker and text lexemes. Whether a backslash token
//! is a marker is decided by the caller, so the same lexer serves both
//! import kinds.

/// One lexical item of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lexeme {
    Marker {
        marker: String,
        line: usize,
        /// Marker is the first thing on its line
        line_start: bool,
    },
    Text {
        text: String,
        line: usize,
        /// Text opens a line, so it continues the previous segment
        continuation: bool,
    },
}

/// The backslash token at the start of `s`: a backslash followed by
/// everything up to whitespace or another backslash, or up to and including
/// a `*`.
fn marker_token(s: &str) -> &str {
    let mut end = 1;
    for ch in s[1..].chars() {
        if ch.is_whitespace() || ch == '\\' {
            break;
        }
        end += ch.len_utf8();
        if ch == '*' {
            break;
        }
    }
    &s[..end]
}

/// Lexes `text`. `is_marker(token, line_start)` decides whether a backslash
/// token is a marker; tokens it rejects stay in the text.
pub(crate) fn lex<F>(text: &str, is_marker: F) -> Vec<Lexeme>
where
    F: Fn(&str, bool) -> bool,
{
    let mut lexemes = Vec::new();
    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let mut rest = raw_line.trim();
        let mut pending = String::new();
        let mut continuation = true;
        let mut first = true;

        while !rest.is_empty() {
            let Some(pos) = rest.find('\\') else {
                pending.push_str(rest);
                break;
            };
            pending.push_str(&rest[..pos]);
            let candidate = &rest[pos..];
            let token = marker_token(candidate);
            let line_start = first && pos == 0 && pending.is_empty();
            first = false;

            if token.len() > 1 && is_marker(token, line_start) {
                if !pending.is_empty() {
                    lexemes.push(Lexeme::Text {
                        text: std::mem::take(&mut pending),
                        line,
                        continuation,
                    });
                }
                continuation = false;
                lexemes.push(Lexeme::Marker {
                    marker: token.to_string(),
                    line,
                    line_start,
                });
                rest = &candidate[token.len()..];
                // one separating space belongs to a begin marker
                if !token.ends_with('*') {
                    if let Some(ch) = rest.chars().next().filter(|c| c.is_whitespace()) {
                        rest = &rest[ch.len_utf8()..];
                    }
                }
            } else {
                pending.push_str(token);
                rest = &candidate[token.len()..];
            }
        }

        if !pending.is_empty() {
            lexemes.push(Lexeme::Text {
                text: pending,
                line,
                continuation,
            });
        }
    }
    lexemes
}
