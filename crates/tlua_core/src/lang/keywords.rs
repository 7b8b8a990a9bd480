//! Define the reserved keyword vocabulary for the tlua dialect.
//!
//! This module is the single source of truth for reserved words: a stable identifier
//! ([`KeywordId`]) plus a const metadata table ([`KEYWORDS`]).
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Some reserved words are also “word operators” (`and`, `or`, `not`). If you need operator priority or fixity,
//!   use [`crate::lang::operators`].
//!
//! ## Examples
//! ```rust
//! use tlua_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("local"), Some(KeywordId::Local));
//! assert!(keywords::is_keyword("repeat"));
//! assert!(!keywords::is_keyword("self"));
//! ```

/// Stable identifier for every reserved keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Blocks / control flow
    Do,
    End,
    While,
    Repeat,
    Until,
    If,
    Then,
    Elseif,
    Else,
    For,
    In,
    Break,
    Return,

    // Declarations
    Function,
    Local,

    // Literals
    Nil,
    True,
    False,

    // Word operators
    Not,
    And,
    Or,
}

/// High-level grouping for documentation and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    ControlFlow,
    Declaration,
    Literal,
    Operator,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
    /// Whether the keyword may begin a statement.
    pub starts_statement: bool,
}

/// Registry of all keywords.
///
/// ## Notes
/// - The ordering is not semantically meaningful, but is grouped for readability.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Blocks / control flow
    info(KeywordId::Do, "do", KeywordCategory::ControlFlow, true),
    info(KeywordId::End, "end", KeywordCategory::ControlFlow, false),
    info(KeywordId::While, "while", KeywordCategory::ControlFlow, true),
    info(KeywordId::Repeat, "repeat", KeywordCategory::ControlFlow, true),
    info(KeywordId::Until, "until", KeywordCategory::ControlFlow, false),
    info(KeywordId::If, "if", KeywordCategory::ControlFlow, true),
    info(KeywordId::Then, "then", KeywordCategory::ControlFlow, false),
    info(KeywordId::Elseif, "elseif", KeywordCategory::ControlFlow, false),
    info(KeywordId::Else, "else", KeywordCategory::ControlFlow, false),
    info(KeywordId::For, "for", KeywordCategory::ControlFlow, true),
    info(KeywordId::In, "in", KeywordCategory::ControlFlow, false),
    info(KeywordId::Break, "break", KeywordCategory::ControlFlow, false),
    info(KeywordId::Return, "return", KeywordCategory::ControlFlow, false),
    // Declarations
    info(KeywordId::Function, "function", KeywordCategory::Declaration, true),
    info(KeywordId::Local, "local", KeywordCategory::Declaration, true),
    // Literals
    info(KeywordId::Nil, "nil", KeywordCategory::Literal, false),
    info(KeywordId::True, "true", KeywordCategory::Literal, false),
    info(KeywordId::False, "false", KeywordCategory::Literal, false),
    // Word operators
    info(KeywordId::Not, "not", KeywordCategory::Operator, false),
    info(KeywordId::And, "and", KeywordCategory::Operator, false),
    info(KeywordId::Or, "or", KeywordCategory::Operator, false),
];

/// Return the canonical spelling for a keyword.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Return the full metadata entry for a keyword.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

/// Resolve a spelling to a keyword identifier.
///
/// ## Returns
/// - `Some(KeywordId)` if the word is reserved.
/// - `None` otherwise.
pub fn from_str(word: &str) -> Option<KeywordId> {
    KEYWORDS.iter().find(|k| k.canonical == word).map(|k| k.id)
}

/// Check whether a word is reserved and therefore cannot be used as a name.
pub fn is_keyword(word: &str) -> bool {
    from_str(word).is_some()
}

// --- helpers -----------------------------------------------------------------

const fn info(id: KeywordId, canonical: &'static str, category: KeywordCategory, starts_statement: bool) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        category,
        starts_statement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_keywords() {
        let starters: Vec<_> = KEYWORDS.iter().filter(|k| k.starts_statement).map(|k| k.canonical).collect();
        assert_eq!(starters, vec!["do", "while", "repeat", "if", "for", "function", "local"]);
    }

    #[test]
    fn test_non_keywords() {
        assert_eq!(from_str("goto"), None);
        assert_eq!(from_str("End"), None);
    }
}
