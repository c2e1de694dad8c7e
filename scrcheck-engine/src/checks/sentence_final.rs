use crate::check::{CheckId, CheckParameters, ScriptureCheck, TextSubstring};
use scrcheck_core::{FieldId, ObjectId, TextType, Token};

const ID: CheckId = CheckId::from_u128(0x0e4b_91d3_58a6_4f0c_b27d_64c9_a1f8_5e30);
const DEFAULT_PUNCTUATION: &str = ".?!";

fn is_closing(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            '"' | '\'' | ')' | ']' | '}' | '\u{2019}' | '\u{201D}' | '\u{00BB}' | '\u{203A}'
        )
}

/// Reports paragraphs of sentence-initial styles whose text does not end in
/// sentence-final punctuation.
#[derive(Debug)]
pub struct SentenceFinalPunctuationCheck {
    styles: Vec<String>,
    punctuation: Vec<char>,
}

impl SentenceFinalPunctuationCheck {
    pub fn new(params: &dyn CheckParameters) -> Self {
        let styles = params
            .parameter_value("SentenceInitialStyles")
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let mut punctuation = params.parameter_value("SentenceFinalPunctuation");
        if punctuation.is_empty() {
            punctuation = DEFAULT_PUNCTUATION.to_string();
        }
        Self {
            styles,
            punctuation: punctuation.chars().collect(),
        }
    }

    /// Reports `last` if its paragraph should end a sentence and does not.
    fn finish(&self, last: Option<Token>, record: &mut dyn FnMut(TextSubstring, CheckId)) {
        let Some(token) = last else {
            return;
        };
        if !self.styles.iter().any(|s| *s == token.paragraph_style) {
            return;
        }
        let chars: Vec<char> = token.text.chars().collect();
        let Some(pos) = chars.iter().rposition(|c| !is_closing(*c)) else {
            return;
        };
        if !self.punctuation.contains(&chars[pos]) {
            record(
                TextSubstring::new(&token, pos, 1, "Missing sentence-final punctuation"),
                ID,
            );
        }
    }
}

impl ScriptureCheck for SentenceFinalPunctuationCheck {
    fn check_id(&self) -> CheckId {
        ID
    }

    fn name(&self) -> &str {
        "Sentence-Final Punctuation"
    }

    fn description(&self) -> &str {
        "Finds paragraphs that do not end with sentence-final punctuation"
    }

    fn relative_order(&self) -> f32 {
        2.0
    }

    fn check(
        &self,
        tokens: &mut dyn Iterator<Item = Token>,
        record: &mut dyn FnMut(TextSubstring, CheckId),
    ) {
        let mut paragraph: Option<(ObjectId, FieldId)> = None;
        let mut last: Option<Token> = None;
        for token in tokens {
            match token.text_type {
                TextType::Note | TextType::PictureCaption => continue,
                _ => {}
            }
            let owner = (token.owner, token.field_id);
            if paragraph != Some(owner) {
                self.finish(last.take(), record);
                paragraph = Some(owner);
            }
            match token.text_type {
                TextType::ChapterNumber | TextType::VerseNumber => {}
                _ if token.text.trim().is_empty() => {}
                _ => last = Some(token),
            }
        }
        self.finish(last, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrcheck_core::BcvRef;

    struct Params;

    impl CheckParameters for Params {
        fn parameter_value(&self, name: &str) -> String {
            match name {
                "SentenceInitialStyles" => "Paragraph\nLine1".to_string(),
                _ => String::new(),
            }
        }
    }

    fn token(text: &str, owner: u64, style: &str) -> Token {
        let mut token = Token::new(text, BcvRef::new(1, 1, 1), ObjectId(owner));
        token.paragraph_style = style.to_string();
        token
    }

    fn run(tokens: Vec<Token>) -> Vec<(ObjectId, String)> {
        let mut found = Vec::new();
        SentenceFinalPunctuationCheck::new(&Params).check(
            &mut tokens.into_iter(),
            &mut |report, _| found.push((report.token.owner, report.quote())),
        );
        found
    }

    #[test]
    fn test_paragraph_endings() {
        let found = run(vec![
            token("He said, \"Go.\" ", 1, "Paragraph"),
            token("no stop here", 2, "Paragraph"),
            token("A heading", 3, "Section Head"),
            token("first part", 4, "Line1"),
            token("second part!", 4, "Line1"),
        ]);
        assert_eq!(found, vec![(ObjectId(2), "e".to_string())]);
    }

    #[test]
    fn test_notes_do_not_end_paragraphs() {
        let mut note = token("a note", 9, "Note General Paragraph");
        note.text_type = TextType::Note;
        let found = run(vec![token("text", 1, "Paragraph"), note, token(" more.", 1, "Paragraph")]);
        assert!(found.is_empty());
    }
}
