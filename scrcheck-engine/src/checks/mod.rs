//! Built-in checks

mod repeated_words;
mod sentence_final;

pub use repeated_words::RepeatedWordsCheck;
pub use sentence_final::SentenceFinalPunctuationCheck;

use crate::check::{CheckParameters, ScriptureCheck};

/// Every built-in check, configured from `params`, in listing order.
pub fn builtin_checks(params: &dyn CheckParameters) -> Vec<Box<dyn ScriptureCheck>> {
    let mut checks: Vec<Box<dyn ScriptureCheck>> = vec![
        Box::new(RepeatedWordsCheck::new()),
        Box::new(SentenceFinalPunctuationCheck::new(params)),
    ];
    checks.sort_by(|a, b| {
        a.group()
            .cmp(b.group())
            .then(a.relative_order().total_cmp(&b.relative_order()))
    });
    checks
}

/// Finds a check by name, ignoring case.
pub fn find_check<'a>(
    checks: &'a [Box<dyn ScriptureCheck>],
    name: &str,
) -> Option<&'a dyn ScriptureCheck> {
    checks
        .iter()
        .find(|c| c.name().eq_ignore_ascii_case(name))
        .map(|c| c.as_ref())
}
