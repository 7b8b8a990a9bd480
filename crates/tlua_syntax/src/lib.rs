//! Shared syntax frontend for tlua: scannerless parser, AST arena, scopes, annotations and the walker base.
//!
//! This crate is dependency-light and intended for reuse across the analyzer, the unparser and the CLI.
//!
//! ## Notes
//! - Parsing and scope resolution happen in the same pass: every [`ast::Variable`] node already carries the
//!   [`scope::VarId`] it refers to.
//! - This crate does no type checking. Annotations are kept in their parsed form ([`annotations::ParsedTyping`])
//!   and resolved by the analyzer.
//! - Vocabulary identity (keywords/operators/builtin type names) comes from `tlua_core::lang` registries.
//!
//! ## Examples
//! ```rust
//! use tlua_syntax::parser;
//!
//! let chunk = parser::parse("local x = 1\nprint(x)\n").unwrap();
//! assert_eq!(chunk.block().len(), 2);
//! ```
//!
//! ## See also
//! - `tlua_core::typing` for the typings the analyzer stores on nodes.

pub mod annotations;
pub mod ast;
pub mod diagnostics;
pub mod lines;
pub mod parser;
pub mod scope;
pub mod walker;
