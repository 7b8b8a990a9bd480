//! Literal values shared by the syntax tree and the typing model.

use std::fmt;

/// A literal value as written in source or in a type annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl ConstantValue {
    /// Render the literal the way it would be written in source (strings are double-quoted and escaped).
    pub fn to_source(&self) -> String {
        match self {
            ConstantValue::Nil => "nil".to_string(),
            ConstantValue::Boolean(b) => b.to_string(),
            ConstantValue::Number(n) => format_number(*n),
            ConstantValue::String(s) => quote_string(s),
        }
    }

    /// Whether this literal is `nil` or `false`.
    pub fn is_falsy(&self) -> bool {
        matches!(self, ConstantValue::Nil | ConstantValue::Boolean(false))
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

/// Format a number so that it reads back to the same value.
///
/// ## Notes
/// - Integral values print without a fractional part (`3`, not `3.0`).
/// - Non-finite values print as the arithmetic expressions Lua uses for them (`1/0`, `-1/0`, `0/0`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "0/0".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "1/0".to_string() } else { "-1/0".to_string() }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Quote and escape a string literal using double quotes.
///
/// ## Notes
/// - Control bytes and non-printable characters use three-digit decimal escapes (`\009`) so a following digit can
///   never be absorbed into the escape when the text is read back.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => out.push_str(&format!("\\{:03}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
