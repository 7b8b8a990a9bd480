//! Unparser configuration
//!
//! Defaults reproduce the source as closely as possible: tab indentation, statements kept on their
//! source lines, annotations re-emitted, inferred typings left out.

/// Unparser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    /// Indentation unit for one block level
    pub indent: IndentStyle,
    /// Append every inferred typing as a long comment after its node
    pub emit_typings: bool,
    /// Re-emit type annotations (`local x: number`, `(a: string)`, `): T`)
    pub keep_annotations: bool,
    /// Keep statements and comments on their source lines
    pub preserve_lines: bool,
}

/// Indentation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Tabs,
    Spaces(usize),
}

impl IndentStyle {
    /// The text of one indentation level.
    pub fn unit(self) -> String {
        match self {
            IndentStyle::Tabs => "\t".to_string(),
            IndentStyle::Spaces(width) => " ".repeat(width),
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent: IndentStyle::Tabs,
            emit_typings: false,
            keep_annotations: true,
            preserve_lines: true,
        }
    }
}

impl FormatConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent with `width` spaces instead of tabs
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent = IndentStyle::Spaces(width);
        self
    }

    pub fn with_indent(mut self, indent: IndentStyle) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_emit_typings(mut self, emit: bool) -> Self {
        self.emit_typings = emit;
        self
    }

    pub fn with_keep_annotations(mut self, keep: bool) -> Self {
        self.keep_annotations = keep;
        self
    }

    /// When off, every statement starts on a fresh line and blank lines are dropped
    pub fn with_preserve_lines(mut self, preserve: bool) -> Self {
        self.preserve_lines = preserve;
        self
    }
}
