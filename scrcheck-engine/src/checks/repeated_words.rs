use crate::check::{CheckId, ScriptureCheck, TextSubstring};
use scrcheck_core::{TextType, Token};

const ID: CheckId = CheckId::from_u128(0x6c1d_2a7e_3f52_4c1b_9a8e_0d5f_7b21_c3e4);

/// Reports a word repeated immediately after itself within one token,
/// ignoring case ("the the").
#[derive(Debug, Default)]
pub struct RepeatedWordsCheck;

impl RepeatedWordsCheck {
    pub fn new() -> Self {
        Self
    }
}

/// Words as (char offset, char length, lowercased text, punctuation chars
/// since the previous word).
fn words(text: &str) -> Vec<(usize, usize, String, usize)> {
    let mut words = Vec::new();
    let mut current: Option<(usize, String)> = None;
    // chars of non-space, non-word text seen since the last word
    let mut gap_punct = 0;
    for (i, ch) in text.chars().enumerate() {
        if ch.is_alphanumeric() || ch == '\'' || ch == '\u{2019}' {
            match &mut current {
                Some((_, word)) => word.push(ch),
                None => current = Some((i, ch.to_string())),
            }
            continue;
        }
        if let Some((start, word)) = current.take() {
            let len = word.chars().count();
            words.push((start, len, word.to_lowercase(), gap_punct));
            gap_punct = 0;
        }
        if !ch.is_whitespace() {
            gap_punct += 1;
        }
    }
    if let Some((start, word)) = current {
        let len = word.chars().count();
        words.push((start, len, word.to_lowercase(), gap_punct));
    }
    words
}

impl ScriptureCheck for RepeatedWordsCheck {
    fn check_id(&self) -> CheckId {
        ID
    }

    fn name(&self) -> &str {
        "Repeated Words"
    }

    fn description(&self) -> &str {
        "Finds words that are immediately repeated"
    }

    fn relative_order(&self) -> f32 {
        1.0
    }

    fn check(
        &self,
        tokens: &mut dyn Iterator<Item = Token>,
        record: &mut dyn FnMut(TextSubstring, CheckId),
    ) {
        for token in tokens {
            if matches!(token.text_type, TextType::ChapterNumber | TextType::VerseNumber) {
                continue;
            }
            let words = words(&token.text);
            for pair in words.windows(2) {
                let (_, _, previous, _) = &pair[0];
                let (offset, length, word, punct_between) = &pair[1];
                if *punct_between == 0 && word == previous && !word.chars().all(|c| c.is_numeric()) {
                    record(TextSubstring::new(&token, *offset, *length, "Repeated word"), ID);
                }
            }
        }
    }
}
