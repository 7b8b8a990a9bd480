//! Parser for the tlua dialect.
//!
//! Scannerless recursive descent: every token match first skips whitespace and comments, then matches directly
//! against the source text. Identifiers are resolved against the scope tree while parsing, so the resulting
//! [`MainChunk`] already knows which declaration every variable occurrence refers to.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use tlua_syntax::parser;
//!
//! let chunk = parser::parse("local x = 1\nprint(x)\n").unwrap();
//! assert_eq!(chunk.block().len(), 2);
//! ```

use std::borrow::Cow;

use crate::annotations::{ParsedFunctionTyping, ParsedParameter, ParsedTyping};
use crate::ast::*;
use crate::diagnostics::{ParseError, ParseResult};
use crate::lines::{LineIndex, normalize_line_endings};
use crate::scope::{ScopeId, ScopeTree, VarId};
use tlua_core::ConstantValue;
use tlua_core::lang::keywords::{self, KeywordId};
use tlua_core::lang::operators::{self, Fixity, OperatorId};

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/scanner.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/literals.rs");
include!("parser/funcs.rs");
include!("parser/types.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
