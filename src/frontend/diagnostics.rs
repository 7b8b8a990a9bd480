//! Diagnostics and error reporting for tlua analysis.
//!
//! Analysis never aborts: every finding is a [`Diagnostic`] with a fixed [`DiagnosticCode`], the byte offset it
//! refers to, and an optional message. The [`errors`] catalog builds them with consistent wording, and
//! [`format_diagnostic`] renders one with its source line and a caret.

use std::fmt;

use tlua_syntax::lines::LineIndex;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Error => write!(f, "error"),
            DiagnosticKind::Warning => write!(f, "warning"),
        }
    }
}

/// The fixed set of analysis findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    CannotCast,
    CannotCastReturn,
    UnknownType,
    WrongParameters,
    CannotCall,
    ImplicitVariable,
    ImplicitParameter,
    UnknownBinaryOp,
    ImplicitCall,
}

impl DiagnosticCode {
    pub const ALL: [DiagnosticCode; 9] = [
        DiagnosticCode::CannotCast,
        DiagnosticCode::CannotCastReturn,
        DiagnosticCode::UnknownType,
        DiagnosticCode::WrongParameters,
        DiagnosticCode::CannotCall,
        DiagnosticCode::ImplicitVariable,
        DiagnosticCode::ImplicitParameter,
        DiagnosticCode::UnknownBinaryOp,
        DiagnosticCode::ImplicitCall,
    ];

    /// Stable identifier used in output and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::CannotCast => "ERROR_CANNOT_CAST",
            DiagnosticCode::CannotCastReturn => "ERROR_CANNOT_CAST_RETURN",
            DiagnosticCode::UnknownType => "ERROR_UNKNOWN_TYPE",
            DiagnosticCode::WrongParameters => "ERROR_WRONG_PARAMETERS",
            DiagnosticCode::CannotCall => "ERROR_CANNOT_CALL",
            DiagnosticCode::ImplicitVariable => "WARNING_IMPLICIT_VARIABLE",
            DiagnosticCode::ImplicitParameter => "WARNING_IMPLICIT_PARAMETER",
            DiagnosticCode::UnknownBinaryOp => "WARNING_UNKNOWN_BINARY_OP",
            DiagnosticCode::ImplicitCall => "WARNING_IMPLICIT_CALL",
        }
    }

    pub fn kind(self) -> DiagnosticKind {
        match self {
            DiagnosticCode::CannotCast
            | DiagnosticCode::CannotCastReturn
            | DiagnosticCode::UnknownType
            | DiagnosticCode::WrongParameters
            | DiagnosticCode::CannotCall => DiagnosticKind::Error,
            DiagnosticCode::ImplicitVariable
            | DiagnosticCode::ImplicitParameter
            | DiagnosticCode::UnknownBinaryOp
            | DiagnosticCode::ImplicitCall => DiagnosticKind::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An analysis finding with location information.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: DiagnosticCode,
    /// Byte offset in the (line-ending normalized) source.
    pub index: usize,
    pub message: Option<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, index: usize) -> Self {
        Self {
            kind: code.kind(),
            code,
            index,
            message: None,
            hints: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.code, message),
            None => write!(f, "{}", self.code),
        }
    }
}

/// Render a diagnostic with its source line and a caret.
///
/// ## Parameters
/// - `file_name`: shown in the location line.
/// - `source`: the normalized source text the offsets refer to.
/// - `lines`: the line index built for `source`.
/// - `colored`: whether to emit ANSI color codes.
pub fn format_diagnostic(
    file_name: &str,
    source: &str,
    lines: &LineIndex,
    diagnostic: &Diagnostic,
    colored: bool,
) -> String {
    let (line_num, col_num, line_text) = line_info(source, lines, diagnostic.index);

    let paint = |code: &'static str| if colored { code } else { "" };
    let red = paint("\x1b[31m");
    let cyan = paint("\x1b[36m");
    let yellow = paint("\x1b[33m");
    let bold = paint("\x1b[1m");
    let reset = paint("\x1b[0m");

    let kind_color = match diagnostic.kind {
        DiagnosticKind::Error => red,
        DiagnosticKind::Warning => yellow,
    };

    let mut out = String::new();
    let message = diagnostic.message.as_deref().unwrap_or("");
    out.push_str(&format!(
        "{bold}{kind_color}{kind}[{code}]{reset}{bold}: {message}{reset}\n",
        kind = diagnostic.kind,
        code = diagnostic.code,
    ));
    out.push_str(&format!("  {cyan}-->{reset} {file_name}:{line_num}:{col_num}\n"));

    let width = line_num.to_string().len();
    out.push_str(&format!("  {cyan}{:>width$} |{reset}\n", ""));
    out.push_str(&format!("  {cyan}{:>width$} |{reset} {}\n", line_num, line_text));
    out.push_str(&format!(
        "  {cyan}{:>width$} |{reset} {}{kind_color}^{reset}\n",
        "",
        " ".repeat(col_num.saturating_sub(1)),
    ));

    for hint in &diagnostic.hints {
        out.push_str(&format!("  {cyan}= hint:{reset} {}\n", hint));
    }
    out
}

/// Print a diagnostic to stderr with colors.
pub fn print_diagnostic(file_name: &str, source: &str, lines: &LineIndex, diagnostic: &Diagnostic) {
    eprintln!("{}", format_diagnostic(file_name, source, lines, diagnostic, true));
}

/// Line number, column number and line text for a byte offset.
fn line_info<'s>(source: &'s str, lines: &LineIndex, offset: usize) -> (usize, usize, &'s str) {
    let offset = offset.min(source.len());
    let line_num = lines.line(offset);
    let line_start = lines.line_start(line_num).unwrap_or(0).min(source.len());
    let line_end = source[line_start..]
        .find('\n')
        .map(|i| line_start + i)
        .unwrap_or(source.len());
    (line_num, offset - line_start + 1, &source[line_start..line_end])
}

// ============================================================================
// Diagnostic catalog
// ============================================================================

/// Builders for every diagnostic the analyzer emits.
pub mod errors {
    use super::*;

    pub fn cannot_cast(target: &str, value: &str, index: usize) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::CannotCast, index).with_message(format!("Cannot cast '{value}' to '{target}'"))
    }

    /// A call argument rejected by its parameter (`position` is 0-based).
    pub fn cannot_cast_parameter(position: usize, name: &str, target: &str, value: &str, index: usize) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::CannotCast, index).with_message(format!(
            "Cannot cast '{value}' to '{target}' for the {} parameter '{name}'",
            ordinal(position + 1)
        ))
    }

    /// A surplus call argument rejected by the callee's vararg parameter (`position` is 0-based).
    pub fn cannot_cast_vararg(position: usize, target: &str, value: &str, index: usize) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::CannotCast, index).with_message(format!(
            "Cannot cast '{value}' to '{target}' for the {} argument (vararg parameter '...')",
            ordinal(position + 1)
        ))
    }

    pub fn cannot_cast_return(target: &str, value: &str, index: usize) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::CannotCastReturn, index)
            .with_message(format!("Cannot cast return value '{value}' to the declared '{target}'"))
    }

    pub fn unknown_type(name: &str, index: usize) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::UnknownType, index)
            .with_message(format!("Unknown type '{name}'"))
            .with_hint("Builtin types are number, string, boolean, nil, true, false and any")
    }

    /// Too few or too many arguments.
    pub fn wrong_parameters(expected: usize, at_least: bool, got: usize, index: usize) -> Diagnostic {
        let quantity = if at_least { "at least " } else { "" };
        let noun = if expected == 1 { "argument" } else { "arguments" };
        Diagnostic::new(DiagnosticCode::WrongParameters, index)
            .with_message(format!("Expected {quantity}{expected} {noun}, got {got}"))
    }

    pub fn cannot_call(typing: &str, index: usize) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::CannotCall, index).with_message(format!("Cannot call a value of type '{typing}'"))
    }

    pub fn implicit_variable(name: &str, index: usize) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::ImplicitVariable, index)
            .with_message(format!("Variable '{name}' is implicitly 'any'"))
            .with_hint(format!("Add an annotation: local {name}: <type>"))
    }

    pub fn implicit_parameter(name: &str, index: usize) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::ImplicitParameter, index)
            .with_message(format!("Parameter '{name}' is implicitly 'any'"))
    }

    pub fn unknown_binary_op(left: &str, operator: &str, right: &str, index: usize) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::UnknownBinaryOp, index)
            .with_message(format!("Unknown result of '{left}' {operator} '{right}', assuming 'any'"))
    }

    pub fn implicit_call(index: usize) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::ImplicitCall, index)
            .with_message("Calling a value of type 'any'; its results are 'any'")
    }

    /// `1` → `1st`, `2` → `2nd`, `11` → `11th`, `22` → `22nd`.
    pub fn ordinal(n: usize) -> String {
        let suffix = match (n % 10, n % 100) {
            (_, 11..=13) => "th",
            (1, _) => "st",
            (2, _) => "nd",
            (3, _) => "rd",
            _ => "th",
        };
        format!("{n}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_have_matching_kinds() {
        for code in DiagnosticCode::ALL {
            let prefix = match code.kind() {
                DiagnosticKind::Error => "ERROR_",
                DiagnosticKind::Warning => "WARNING_",
            };
            assert!(code.as_str().starts_with(prefix), "{code}");
        }
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(errors::ordinal(1), "1st");
        assert_eq!(errors::ordinal(2), "2nd");
        assert_eq!(errors::ordinal(3), "3rd");
        assert_eq!(errors::ordinal(4), "4th");
        assert_eq!(errors::ordinal(11), "11th");
        assert_eq!(errors::ordinal(12), "12th");
        assert_eq!(errors::ordinal(21), "21st");
        assert_eq!(errors::ordinal(112), "112th");
    }

    #[test]
    fn test_wrong_parameters_wording() {
        let exact = errors::wrong_parameters(2, false, 1, 0);
        assert_eq!(exact.message.as_deref(), Some("Expected 2 arguments, got 1"));
        let at_least = errors::wrong_parameters(1, true, 0, 0);
        assert_eq!(at_least.message.as_deref(), Some("Expected at least 1 argument, got 0"));
    }

    #[test]
    fn test_format_diagnostic_points_at_column() {
        let source = "local a = 1\nlocal b: string = a\n";
        let lines = LineIndex::new(source);
        let diagnostic = errors::cannot_cast("string", "number", source.rfind('a').unwrap_or(0));
        let rendered = format_diagnostic("main.lua", source, &lines, &diagnostic, false);
        let expected = "\
error[ERROR_CANNOT_CAST]: Cannot cast 'number' to 'string'
  --> main.lua:2:19
    |
  2 | local b: string = a
    |                   ^
";
        assert_eq!(rendered, expected);
    }
}
