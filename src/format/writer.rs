//! Output writer with indentation and line tracking
//!
//! Handles indentation, the current output line (so the unparser can keep statements on their source
//! lines), and the separators tokens need so they do not fuse when read back.

use super::config::FormatConfig;

/// Writer that tracks indentation and builds unparsed output
pub struct FormatWriter {
    /// The output buffer
    output: String,
    /// Text of one indentation level
    indent_unit: String,
    /// Current indentation level
    indent_level: usize,
    /// Whether we're at the start of a line
    at_line_start: bool,
    /// A space was requested and is written before the next token on this line
    pending_space: bool,
    /// 1-based line the next write lands on
    line: usize,
}

impl FormatWriter {
    /// Create a new format writer with the given config
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            output: String::new(),
            indent_unit: config.indent.unit(),
            indent_level: 0,
            at_line_start: true,
            pending_space: false,
            line: 1,
        }
    }

    /// Get the output, terminated by a line break unless empty
    pub fn finish(mut self) -> String {
        if !self.at_line_start {
            self.newline();
        }
        self.output
    }

    /// Increase indentation level
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indentation level
    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) {
        if self.at_line_start {
            for _ in 0..self.indent_level {
                self.output.push_str(&self.indent_unit);
            }
            self.at_line_start = false;
            self.pending_space = false;
        }
    }

    /// Write a token that contains no line break.
    ///
    /// A space is inserted first when the token would otherwise fuse with the previous one (`local x`,
    /// `- -x`).
    pub fn write(&mut self, s: &str) {
        let Some(first) = s.chars().next() else {
            return;
        };
        self.write_indent();
        if self.pending_space || self.output.chars().next_back().is_some_and(|last| fuses(last, first)) {
            self.output.push(' ');
        }
        self.pending_space = false;
        self.output.push_str(s);
    }

    /// Write text verbatim, line breaks included (long comment bodies).
    ///
    /// Lines after the first are not indented, so the text reads back unchanged.
    pub fn write_raw(&mut self, s: &str) {
        let Some((head, rest)) = s.split_once('\n') else {
            self.write(s);
            return;
        };
        self.write(head);
        self.output.push('\n');
        self.output.push_str(rest);
        self.line += 1 + rest.matches('\n').count();
        self.at_line_start = false;
    }

    /// Request a separating space before the next token on this line
    pub fn space(&mut self) {
        if !self.at_line_start {
            self.pending_space = true;
        }
    }

    /// Write just a newline
    pub fn newline(&mut self) {
        self.output.push('\n');
        self.line += 1;
        self.at_line_start = true;
        self.pending_space = false;
    }

    /// Break lines until the next write lands on `line` (never moves backwards)
    pub fn ensure_line(&mut self, line: usize) {
        while self.line < line {
            self.newline();
        }
    }

    /// Start a fresh line unless already at one
    pub fn break_line(&mut self) {
        if !self.at_line_start {
            self.newline();
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `a` followed directly by `b` would read back as a different token sequence.
fn fuses(a: char, b: char) -> bool {
    (is_word(a) && is_word(b)) || (a == '-' && b == '-') || (a == '.' && b == '.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::config::IndentStyle;

    fn default_writer() -> FormatWriter {
        FormatWriter::new(&FormatConfig::default())
    }

    // ========================================
    // Construction tests
    // ========================================

    #[test]
    fn test_new_writer_empty_output() {
        let writer = default_writer();
        assert!(writer.at_line_start);
        assert_eq!(writer.line, 1);
        assert_eq!(writer.finish(), "");
    }

    // ========================================
    // Write tests
    // ========================================

    #[test]
    fn test_write_simple() {
        let mut writer = default_writer();
        writer.write("print");
        writer.write("(");
        writer.write(")");
        assert_eq!(writer.finish(), "print()\n");
    }

    #[test]
    fn test_write_empty_string() {
        let mut writer = default_writer();
        writer.write("");
        assert!(writer.at_line_start);
        assert_eq!(writer.finish(), "");
    }

    #[test]
    fn test_write_separates_words() {
        let mut writer = default_writer();
        writer.write("local");
        writer.write("x");
        writer.write("=");
        assert_eq!(writer.finish(), "local x=\n");
    }

    #[test]
    fn test_write_separates_minus_signs() {
        let mut writer = default_writer();
        writer.write("-");
        writer.write("-");
        writer.write("x");
        assert_eq!(writer.finish(), "- -x\n");
    }

    #[test]
    fn test_write_separates_dots() {
        let mut writer = default_writer();
        writer.write("a");
        writer.write("..");
        writer.write("...");
        assert_eq!(writer.finish(), "a.. ...\n");
    }

    #[test]
    fn test_space_is_lazy() {
        let mut writer = default_writer();
        writer.write("x");
        writer.space();
        writer.space();
        writer.write("+");
        writer.space();
        writer.newline();
        writer.space();
        writer.write("y");
        assert_eq!(writer.finish(), "x +\ny\n");
    }

    // ========================================
    // Line tracking tests
    // ========================================

    #[test]
    fn test_newline_counts_lines() {
        let mut writer = default_writer();
        writer.write("a");
        writer.newline();
        writer.newline();
        assert_eq!(writer.line, 3);
    }

    #[test]
    fn test_ensure_line_never_moves_back() {
        let mut writer = default_writer();
        writer.ensure_line(3);
        writer.write("a");
        writer.ensure_line(2);
        writer.write("b");
        assert_eq!(writer.finish(), "\n\na b\n");
    }

    #[test]
    fn test_break_line_only_when_needed() {
        let mut writer = default_writer();
        writer.break_line();
        writer.write("a");
        writer.break_line();
        writer.break_line();
        writer.write("b");
        assert_eq!(writer.finish(), "a\nb\n");
    }

    #[test]
    fn test_write_raw_keeps_inner_lines_unindented() {
        let mut writer = default_writer();
        writer.indent();
        writer.write_raw("--[[one\n  two]]");
        assert_eq!(writer.line, 2);
        assert!(!writer.at_line_start);
        assert_eq!(writer.finish(), "\t--[[one\n  two]]\n");
    }

    // ========================================
    // Indentation tests
    // ========================================

    #[test]
    fn test_indent_affects_output() {
        let mut writer = default_writer();
        writer.write("do");
        writer.indent();
        writer.newline();
        writer.write("x()");
        writer.dedent();
        writer.newline();
        writer.write("end");
        assert_eq!(writer.finish(), "do\n\tx()\nend\n");
    }

    #[test]
    fn test_dedent_at_zero_stays_zero() {
        let mut writer = default_writer();
        writer.dedent();
        writer.write("x");
        assert_eq!(writer.finish(), "x\n");
    }

    #[test]
    fn test_indent_with_spaces() {
        let config = FormatConfig::new().with_indent(IndentStyle::Spaces(2));
        let mut writer = FormatWriter::new(&config);
        writer.indent();
        writer.indent();
        writer.write("x");
        assert_eq!(writer.finish(), "    x\n");
    }
}
