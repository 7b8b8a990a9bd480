//! tlua unparser
//!
//! Turns a parsed chunk back into source text:
//! - comments are kept (line comments as `--text`, long comments with their original level)
//! - statements stay on their source lines unless `preserve_lines` is off
//! - tab indentation by default
//! - inferred typings can be embedded as long comments (`--[[number]]`)

mod config;
mod unparser;
mod writer;

pub use config::{FormatConfig, IndentStyle};
pub use unparser::{Unparser, unparse};

use crate::frontend::ParseError;
use crate::frontend::analyzer::{TypeEnvironment, analyze};
use crate::frontend::parser;

/// Unparse source code with default settings
pub fn format_source(source: &str) -> Result<String, ParseError> {
    format_source_with_config(source, &FormatConfig::default())
}

/// Unparse source code with a custom configuration
///
/// With `emit_typings`, the chunk is analyzed against an empty environment first; callers with their own
/// declarations should parse, analyze and call [`unparse`] themselves.
pub fn format_source_with_config(source: &str, config: &FormatConfig) -> Result<String, ParseError> {
    let mut chunk = parser::parse(source)?;
    if config.emit_typings {
        if let Err(err) = analyze(&mut chunk, &TypeEnvironment::new()) {
            tracing::warn!(%err, "typings unavailable");
        }
    }
    Ok(unparse(&chunk, config))
}

/// Check if source code is already in unparsed form
pub fn check_formatted(source: &str) -> Result<bool, ParseError> {
    let formatted = format_source(source)?;
    Ok(source == formatted)
}

/// Get the diff between original and unparsed source
pub fn format_diff(source: &str) -> Result<Option<String>, ParseError> {
    let formatted = format_source(source)?;
    Ok(diff_lines(source, &formatted))
}

/// Line-by-line diff of two texts, `None` when they are equal
pub fn diff_lines(original: &str, formatted: &str) -> Option<String> {
    if original == formatted {
        return None;
    }

    let mut diff = String::new();
    let original_lines: Vec<&str> = original.lines().collect();
    let formatted_lines: Vec<&str> = formatted.lines().collect();

    for i in 0..original_lines.len().max(formatted_lines.len()) {
        let orig = original_lines.get(i).copied();
        let fmt = formatted_lines.get(i).copied();
        if orig == fmt {
            continue;
        }
        if let Some(orig) = orig {
            diff.push_str(&format!("-{:4} | {}\n", i + 1, orig));
        }
        if let Some(fmt) = fmt {
            diff.push_str(&format!("+{:4} | {}\n", i + 1, fmt));
        }
    }

    Some(diff)
}
