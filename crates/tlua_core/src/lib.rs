//! Provide shared, pure language vocabulary and the structural type model for the tlua front-end.
//!
//! This crate is intentionally small and dependency-free. It contains deterministic building blocks that both:
//! - the parser can use to recognise keywords, operators and literal values, and
//! - the analyzer can use to construct, compare and render typings.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no global state, and no syntax-tree types.
//! - Current scope: canonical language vocabulary ([`lang`]), literal values ([`constant`]) and the
//!   typing model ([`typing`]).

pub mod constant;
pub mod lang;
pub mod typing;

pub use constant::ConstantValue;
pub use typing::{FieldKey, FunctionTyping, InterfaceTyping, Typing, TypingHolder};
