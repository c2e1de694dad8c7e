//! Pluggable check contract

use scrcheck_core::Token;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identity of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(pub Uuid);

impl CheckId {
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Fresh random id, for checks defined at runtime.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CheckId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One reported problem: a span of a token's text plus a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSubstring {
    pub token: Token,
    /// Char offset into `token.text`
    pub offset: usize,
    /// Length in chars
    pub length: usize,
    pub message: String,
}

impl TextSubstring {
    pub fn new(token: &Token, offset: usize, length: usize, message: impl Into<String>) -> Self {
        Self {
            token: token.clone(),
            offset,
            length,
            message: message.into(),
        }
    }

    /// The cited text.
    pub fn quote(&self) -> String {
        self.token.char_slice(self.offset, self.length)
    }

    /// Offset in the owning object's coordinates.
    pub fn owner_offset(&self) -> usize {
        self.token.offset_in_owner + self.offset
    }
}

/// Named configuration values a check may query.
pub trait CheckParameters {
    /// Value of the named parameter; unknown names yield an empty string.
    fn parameter_value(&self, name: &str) -> String;
}

/// A consistency check.
///
/// `check` consumes tokens and calls `record` once per problem found. It
/// must not assume it sees a whole book; the runner may feed it a chapter.
pub trait ScriptureCheck {
    fn check_id(&self) -> CheckId;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Group the check is listed under
    fn group(&self) -> &str {
        "Basic"
    }

    /// Position within its group
    fn relative_order(&self) -> f32 {
        0.0
    }

    fn check(
        &self,
        tokens: &mut dyn Iterator<Item = Token>,
        record: &mut dyn FnMut(TextSubstring, CheckId),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrcheck_core::{BcvRef, ObjectId};

    #[test]
    fn test_quote_and_owner_offset() {
        let mut token = Token::new("This is lousy text", BcvRef::new(1, 3, 34), ObjectId(7));
        token.offset_in_owner = 10;
        let report = TextSubstring::new(&token, 5, 8, "Lousy message");
        assert_eq!(report.quote(), "is lousy");
        assert_eq!(report.owner_offset(), 15);
    }

    #[test]
    fn test_check_id_round_trip() {
        let id = CheckId::from_u128(0x42);
        assert_eq!(id.to_string().parse::<CheckId>().unwrap(), id);
    }
}
