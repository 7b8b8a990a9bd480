//! Operator vocabulary.
//!
//! This module defines the canonical operator set (symbol operators like `+` and word operators
//! like `and`) along with the metadata the parser needs to rebalance expressions: priority,
//! associativity, and fixity.
//!
//! ## Notes
//! - `priority` follows the dialect's table where a **lower number binds tighter**:
//!   `^` (1), unary operators (2), `* / %` (3), `+ -` (4), `..` (5), comparisons (6), `and` (7), `or` (8).
//! - `-` is spelled both as a binary and a unary operator; the two have distinct ids.
//! - Word operators (`and`, `or`, `not`) also appear in the keyword registry ([`crate::lang::keywords`]).
//!
//! ## Examples
//! ```rust
//! use tlua_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::binary_from_str(".."), Some(OperatorId::Concat));
//! assert_eq!(operators::info_for(OperatorId::Concat).priority, 5);
//! assert!(operators::binds_tighter(OperatorId::Mul, OperatorId::Add));
//! ```

use std::fmt;

/// Define how operators associate when chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

/// Define whether an operator is infix (binary) or prefix (unary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
}

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Pow,
    Mul,
    Div,
    Mod,
    Add,
    Sub,

    // Strings
    Concat,

    // Comparison
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,

    // Logical
    And,
    Or,

    // Prefix
    Neg,
    Len,
    Not,
}

impl OperatorId {
    /// Canonical spelling of the operator.
    pub fn as_str(self) -> &'static str {
        info_for(self).spelling
    }

    /// Binding priority (lower binds tighter).
    pub fn priority(self) -> u8 {
        info_for(self).priority
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            OperatorId::Pow | OperatorId::Mul | OperatorId::Div | OperatorId::Mod | OperatorId::Add | OperatorId::Sub
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            OperatorId::Lt | OperatorId::LtEq | OperatorId::Gt | OperatorId::GtEq | OperatorId::Eq | OperatorId::NotEq
        )
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for an operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spelling: &'static str,
    pub priority: u8,
    pub associativity: Associativity,
    pub fixity: Fixity,
    pub is_keyword_spelling: bool,
}

/// Priority shared by every prefix operator.
pub const UNARY_PRIORITY: u8 = 2;

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    // Arithmetic
    op(OperatorId::Pow, "^", 1, Associativity::Right, Fixity::Infix, false),
    op(OperatorId::Mul, "*", 3, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Div, "/", 3, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Mod, "%", 3, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Add, "+", 4, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Sub, "-", 4, Associativity::Left, Fixity::Infix, false),
    // Strings
    op(OperatorId::Concat, "..", 5, Associativity::Right, Fixity::Infix, false),
    // Comparison
    op(OperatorId::LtEq, "<=", 6, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Lt, "<", 6, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::GtEq, ">=", 6, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Gt, ">", 6, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Eq, "==", 6, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::NotEq, "~=", 6, Associativity::Left, Fixity::Infix, false),
    // Logical
    op(OperatorId::And, "and", 7, Associativity::Left, Fixity::Infix, true),
    op(OperatorId::Or, "or", 8, Associativity::Left, Fixity::Infix, true),
    // Prefix
    op(OperatorId::Neg, "-", UNARY_PRIORITY, Associativity::Right, Fixity::Prefix, false),
    op(OperatorId::Len, "#", UNARY_PRIORITY, Associativity::Right, Fixity::Prefix, false),
    op(OperatorId::Not, "not", UNARY_PRIORITY, Associativity::Right, Fixity::Prefix, true),
];

/// Return the full metadata entry for an operator.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS.iter().find(|o| o.id == id).expect("operator info missing")
}

/// Resolve a binary operator spelling to its identifier.
pub fn binary_from_str(spelling: &str) -> Option<OperatorId> {
    find(spelling, Fixity::Infix)
}

/// Resolve a prefix operator spelling to its identifier.
pub fn unary_from_str(spelling: &str) -> Option<OperatorId> {
    find(spelling, Fixity::Prefix)
}

/// Iterate the operators of one fixity, longest spelling first.
///
/// ## Notes
/// - Scannerless matching relies on this order so that `<=` wins over `<`.
pub fn by_longest_spelling(fixity: Fixity) -> impl Iterator<Item = &'static OperatorInfo> {
    let mut infos: Vec<&'static OperatorInfo> = OPERATORS.iter().filter(|o| o.fixity == fixity).collect();
    infos.sort_by(|a, b| b.spelling.len().cmp(&a.spelling.len()));
    infos.into_iter()
}

/// Whether `outer` must be rotated below `inner` when `inner` is found as its right operand.
///
/// ## Notes
/// - `inner` binds looser than `outer` when its priority number is larger.
/// - On equal priority, left-associative operators rotate so chains group left-to-right.
pub fn should_rotate(outer: OperatorId, inner: OperatorId) -> bool {
    let outer_info = info_for(outer);
    let inner_priority = info_for(inner).priority;
    inner_priority > outer_info.priority
        || (inner_priority == outer_info.priority && outer_info.associativity == Associativity::Left)
}

/// Whether `a` binds strictly tighter than `b`.
pub fn binds_tighter(a: OperatorId, b: OperatorId) -> bool {
    info_for(a).priority < info_for(b).priority
}

// --- helpers -----------------------------------------------------------------

fn find(spelling: &str, fixity: Fixity) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|o| o.fixity == fixity && o.spelling == spelling)
        .map(|o| o.id)
}

const fn op(
    id: OperatorId,
    spelling: &'static str,
    priority: u8,
    associativity: Associativity,
    fixity: Fixity,
    is_keyword_spelling: bool,
) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        priority,
        associativity,
        fixity,
        is_keyword_spelling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minus_has_two_fixities() {
        assert_eq!(binary_from_str("-"), Some(OperatorId::Sub));
        assert_eq!(unary_from_str("-"), Some(OperatorId::Neg));
    }

    #[test]
    fn test_longest_spelling_first() {
        let spellings: Vec<_> = by_longest_spelling(Fixity::Infix).map(|o| o.spelling).collect();
        let lt_eq = spellings.iter().position(|s| *s == "<=").unwrap();
        let lt = spellings.iter().position(|s| *s == "<").unwrap();
        assert!(lt_eq < lt);
    }

    #[test]
    fn test_rotation_rules() {
        // a * (b + c) parsed right-recursively must become (a * b) + c
        assert!(should_rotate(OperatorId::Mul, OperatorId::Add));
        // a - (b - c) must become (a - b) - c
        assert!(should_rotate(OperatorId::Sub, OperatorId::Sub));
        // right-associative chains stay nested to the right
        assert!(!should_rotate(OperatorId::Concat, OperatorId::Concat));
        assert!(!should_rotate(OperatorId::Pow, OperatorId::Pow));
        // a + (b * c) is already correct
        assert!(!should_rotate(OperatorId::Add, OperatorId::Mul));
        // -(a + b) from `-a + b` rotates, -(a ^ b) does not
        assert!(should_rotate(OperatorId::Neg, OperatorId::Add));
        assert!(!should_rotate(OperatorId::Neg, OperatorId::Pow));
    }
}
