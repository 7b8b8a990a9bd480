//! tlua language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary: reserved keywords, operators with their
//! binding priorities, and the builtin type names every annotation can refer to.
//!
//! The design goal is to avoid stringly-typed checks scattered across the parser and analyzer.
//! Instead, callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`) and look up
//! spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//! - The parser enforces syntax; registries provide spellings and metadata for shared use (diagnostics,
//!   formatting, operator rebalancing).
//!
//! ## Examples
//! ```rust
//! use tlua_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("elseif"), Some(KeywordId::Elseif));
//! assert_eq!(keywords::as_str(KeywordId::Elseif), "elseif");
//! ```

pub mod keywords;
pub mod operators;
pub mod typings;
