#![forbid(unsafe_code)]
//! tlua: front-end for a gradually-typed Lua dialect
//!
//! Lua source with optional type annotations (`local x: number`, `function f(a: string): boolean`) is parsed into
//! an arena AST with resolved scopes, analyzed by a walker that infers a typing for every node and reports
//! diagnostics, and unparsed back to source (optionally with the inferred typings embedded as comments).
//!
//! - `frontend`: analysis (Function-Flow tracking, the analyzing walker, diagnostics); re-exports the syntax crate
//! - `format`: the unparser
//! - `cli`: the `tlua` binary's commands and standard-library declarations
//!
//! ## Example
//!
//! ```rust
//! use tlua::frontend::analyzer::{TypeEnvironment, analyze};
//!
//! let mut chunk = tlua::parser::parse("local x: number = \"one\"").unwrap();
//! let analysis = analyze(&mut chunk, &TypeEnvironment::new()).unwrap();
//! assert!(analysis.has_errors());
//! ```
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents an analyzer bug (logic error), use `.expect("INVARIANT: reason")`
//!   with a clear explanation.

pub mod cli;
pub mod format;
pub mod frontend;

pub use frontend::analyzer;
pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::parser;

pub use format::{FormatConfig, check_formatted, format_diff, format_source, format_source_with_config, unparse};
