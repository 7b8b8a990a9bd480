//! Parse errors.
//!
//! Parsing stops at the first syntax error. The error carries the byte offset the parser was at, the 1-based line
//! of that offset, and a message in the form `<message> at line <n>`.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// A fatal syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message} at line {line}")]
#[diagnostic(code(tlua::parse))]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the normalized source.
    pub index: usize,
    /// 1-based line of `index`.
    pub line: usize,
    #[label("here")]
    pub span: SourceSpan,
}

impl ParseError {
    pub fn new(message: impl Into<String>, index: usize, line: usize) -> Self {
        Self {
            message: message.into(),
            index,
            line,
            span: SourceSpan::from((index, 0)),
        }
    }
}

/// Result alias used by the parser.
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_appends_line() {
        let err = ParseError::new("Expected `=`", 12, 3);
        assert_eq!(err.to_string(), "Expected `=` at line 3");
        assert_eq!(err.span.offset(), 12);
    }
}
