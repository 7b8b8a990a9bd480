//! Parsed type annotations.
//!
//! These are the syntactic form of annotations as written (`number | nil`, `(a: number) => string`); the
//! analyzer resolves them into `tlua_core::typing::Typing` values by looking names up in its type environment.

use std::fmt;

use tlua_core::ConstantValue;

/// A type annotation as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedTyping {
    /// A type name (`number`, `Point`).
    Name(String),
    /// A literal type (`nil`, `true`, `"on"`, `1`).
    Constant(ConstantValue),
    /// `T[]`
    Array(Box<ParsedTyping>),
    /// `A | B | C`
    Union(Vec<ParsedTyping>),
    /// `A & B & C`
    Intersection(Vec<ParsedTyping>),
    /// `(params) => returns`
    Function(ParsedFunctionTyping),
    /// `(A, B)` or `()`
    Tuple(Vec<ParsedTyping>),
    /// `...T` (trailing tuple element or vararg parameter typing)
    Vararg(Box<ParsedTyping>),
}

/// Signature part of a lambda typing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedFunctionTyping {
    pub parameters: Vec<ParsedParameter>,
    /// Whether the signature ends in a `...` parameter.
    pub variadic: bool,
    /// Annotation of the trailing `...` parameter.
    pub vararg: Option<Box<ParsedTyping>>,
    pub returns: Vec<ParsedTyping>,
}

/// A named parameter inside a lambda typing.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedParameter {
    pub name: String,
    pub typing: Option<ParsedTyping>,
}

impl fmt::Display for ParsedTyping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedTyping::Name(name) => f.write_str(name),
            ParsedTyping::Constant(value) => write!(f, "{}", value),
            ParsedTyping::Array(element) => {
                let parens = matches!(
                    **element,
                    ParsedTyping::Union(_) | ParsedTyping::Intersection(_) | ParsedTyping::Function(_)
                );
                write_member(f, element, parens)?;
                f.write_str("[]")
            }
            ParsedTyping::Union(members) => write_joined(f, members, " | ", |m| matches!(m, ParsedTyping::Function(_))),
            ParsedTyping::Intersection(members) => write_joined(f, members, " & ", |m| {
                matches!(m, ParsedTyping::Union(_) | ParsedTyping::Function(_))
            }),
            ParsedTyping::Function(function) => write!(f, "{}", function),
            ParsedTyping::Tuple(elements) => {
                f.write_str("(")?;
                write_list(f, elements)?;
                f.write_str(")")
            }
            ParsedTyping::Vararg(element) => write!(f, "...{}", element),
        }
    }
}

impl fmt::Display for ParsedFunctionTyping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        if self.variadic {
            if !self.parameters.is_empty() {
                f.write_str(", ")?;
            }
            f.write_str("...")?;
            if let Some(typing) = &self.vararg {
                write!(f, ": {}", typing)?;
            }
        }
        f.write_str(") => ")?;
        write_returns(f, &self.returns)
    }
}

impl fmt::Display for ParsedParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(typing) = &self.typing {
            write!(f, ": {}", typing)?;
        }
        Ok(())
    }
}

/// Render a return list the way it is written after `):` or `=>`.
pub fn write_returns(f: &mut impl fmt::Write, returns: &[ParsedTyping]) -> fmt::Result {
    match returns {
        [single] if !matches!(single, ParsedTyping::Function(_) | ParsedTyping::Vararg(_)) => {
            write!(f, "{}", single)
        }
        elements => {
            f.write_str("(")?;
            write_list(f, elements)?;
            f.write_str(")")
        }
    }
}

fn write_list(f: &mut impl fmt::Write, elements: &[ParsedTyping]) -> fmt::Result {
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", element)?;
    }
    Ok(())
}

fn write_member(f: &mut fmt::Formatter<'_>, typing: &ParsedTyping, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", typing)
    } else {
        write!(f, "{}", typing)
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    members: &[ParsedTyping],
    separator: &str,
    parens: impl Fn(&ParsedTyping) -> bool,
) -> fmt::Result {
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write_member(f, member, parens(member))?;
    }
    Ok(())
}
