//! Byte offset to line translation.

use std::borrow::Cow;

/// Sorted start offsets of every line in a source text.
///
/// ## Notes
/// - Lines are 1-based; a newline character belongs to the line it terminates.
/// - Lookup is an upper-bound binary search over line starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// 1-based line containing `offset`.
    pub fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    /// 1-based column of `offset` within its line (counted in bytes).
    pub fn column(&self, offset: usize) -> usize {
        let line = self.line(offset);
        offset - self.starts[line - 1] + 1
    }

    /// Byte offset where a 1-based line starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|i| self.starts.get(i).copied())
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// Rewrite `\r\n` and lone `\r` line endings as `\n`.
///
/// Every offset the parser reports refers to the normalized text, so callers that print source lines must normalize
/// the same way.
pub fn normalize_line_endings(source: &str) -> Cow<'_, str> {
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_lookup() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line(0), 1);
        assert_eq!(index.line(2), 1); // the newline itself
        assert_eq!(index.line(3), 2);
        assert_eq!(index.line(6), 3);
        assert_eq!(index.line(7), 4);
        assert_eq!(index.line(100), 4);
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn test_column() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.column(0), 1);
        assert_eq!(index.column(4), 2);
        assert_eq!(index.line_start(2), Some(3));
        assert_eq!(index.line_start(0), None);
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
        assert!(matches!(normalize_line_endings("plain\n"), Cow::Borrowed(_)));
    }
}
