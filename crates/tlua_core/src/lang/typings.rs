//! Builtin type names.
//!
//! Every annotation name is resolved through the analyzer's type lookup; these are the entries that lookup is
//! seeded with before any externally supplied declarations.
//!
//! ## Examples
//! ```rust
//! use tlua_core::lang::typings::{self, BuiltinTypingId};
//!
//! assert_eq!(typings::from_str("boolean"), Some(BuiltinTypingId::Boolean));
//! assert_eq!(typings::from_str("Boolean"), None);
//! ```

use crate::typing::Typing;

/// Stable identifier for every builtin type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTypingId {
    Number,
    String,
    Boolean,
    Nil,
    True,
    False,
    Any,
}

/// Metadata for a builtin type name.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTypingInfo {
    pub id: BuiltinTypingId,
    pub canonical: &'static str,
    /// Whether the name denotes a literal constant rather than a class.
    pub is_constant: bool,
}

/// Registry of all builtin type names.
pub const BUILTIN_TYPINGS: &[BuiltinTypingInfo] = &[
    info(BuiltinTypingId::Number, "number", false),
    info(BuiltinTypingId::String, "string", false),
    info(BuiltinTypingId::Boolean, "boolean", false),
    info(BuiltinTypingId::Nil, "nil", true),
    info(BuiltinTypingId::True, "true", true),
    info(BuiltinTypingId::False, "false", true),
    info(BuiltinTypingId::Any, "any", false),
];

pub fn as_str(id: BuiltinTypingId) -> &'static str {
    info_for(id).canonical
}

/// Return the full metadata entry for a builtin type name.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: BuiltinTypingId) -> &'static BuiltinTypingInfo {
    BUILTIN_TYPINGS
        .iter()
        .find(|t| t.id == id)
        .expect("builtin typing info missing")
}

pub fn from_str(name: &str) -> Option<BuiltinTypingId> {
    BUILTIN_TYPINGS.iter().find(|t| t.canonical == name).map(|t| t.id)
}

/// Build the typing a builtin name stands for.
pub fn typing_for(id: BuiltinTypingId) -> Typing {
    match id {
        BuiltinTypingId::Number => Typing::number(),
        BuiltinTypingId::String => Typing::string(),
        BuiltinTypingId::Boolean => Typing::boolean(),
        BuiltinTypingId::Nil => Typing::nil(),
        BuiltinTypingId::True => Typing::constant_bool(true),
        BuiltinTypingId::False => Typing::constant_bool(false),
        BuiltinTypingId::Any => Typing::Any,
    }
}

// --- helpers -----------------------------------------------------------------

const fn info(id: BuiltinTypingId, canonical: &'static str, is_constant: bool) -> BuiltinTypingInfo {
    BuiltinTypingInfo {
        id,
        canonical,
        is_constant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_for_renders_canonical_name() {
        for info in BUILTIN_TYPINGS {
            assert_eq!(typing_for(info.id).to_string(), info.canonical);
        }
    }
}
