//! The fixed, case-insensitive keyword table (spec §4.A).
//!
//! `Keyword` is a closed enum so parser code can match on
//! `Keyword::Select` instead of comparing token text; the scanner only
//! needs [`lookup`] to decide whether an identifier-shaped run of
//! characters is a keyword at all.

use std::str::FromStr;
use strum_macros::{AsRefStr, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr, IntoStaticStr)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum Keyword {
    Select,
    From,
    Where,
    And,
    Or,
    Not,
    With,
    Recursive,
    As,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    On,
    Union,
    All,
    Distinct,
    Group,
    By,
    Having,
    Order,
    Asc,
    Desc,
    Limit,
    Offset,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Create,
    Table,
    Temp,
    Temporary,
    If,
    Exists,
    Alter,
    Add,
    Column,
    Drop,
    Index,
    Unique,
    View,
    Primary,
    Key,
    Foreign,
    References,
    Default,
    Check,
    Constraint,
    Collate,
    Generated,
    Always,
    Stored,
    Null,
    True,
    False,
    In,
    Between,
    Like,
    Is,
    Cascade,
    Restrict,
    #[strum(serialize = "CURRENT_TIMESTAMP")]
    CurrentTimestamp,
    Without,
    Rowid,
    Strict,
    Case,
    When,
    Then,
    Else,
    End,
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

impl Keyword {
    /// The canonical, upper-cased text as it should appear in `Token::text`.
    pub fn canonical(&self) -> &'static str {
        (*self).into()
    }

    pub fn lookup(text: &str) -> Option<Keyword> {
        // `WITHOUT ROWID` and `NO ACTION` are two-word; the scanner only ever
        // sees one identifier-shaped run at a time, so those are recognized
        // by the DDL parser matching adjacent keyword tokens, not here.
        Keyword::from_str(text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(Keyword::lookup("select"), Some(Keyword::Select));
        assert_eq!(Keyword::lookup("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::lookup("SeLeCt"), Some(Keyword::Select));
    }

    #[test]
    fn lookup_rejects_non_keywords() {
        assert_eq!(Keyword::lookup("users"), None);
        assert_eq!(Keyword::lookup(""), None);
    }

    #[test]
    fn canonical_text_is_upper_case() {
        assert_eq!(Keyword::Select.canonical(), "SELECT");
        assert_eq!(Keyword::From.canonical(), "FROM");
    }
}
