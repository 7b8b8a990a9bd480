//! tlua front-end
//!
//! This module contains the analysis half of the pipeline:
//! - `flow`: Function-Flow tracking (what is known about each variable while walking)
//! - `analyzer`: the analyzing walker that types every node
//! - `diagnostics`: analysis findings and their rendering
//!
//! Syntax components (parser, AST, scopes, walker base) come from the shared `tlua_syntax` crate.

pub use tlua_syntax::diagnostics::ParseError;
pub use tlua_syntax::{annotations, ast, lines, parser, scope, walker};

pub mod analyzer;
pub mod diagnostics;
pub mod flow;
