//! Byte offset → line/column conversion.

use crate::ast::{LineColumn, SourceLocation, Span};

/// Precomputed line starts for a source text.
///
/// Lines are 1-based and columns are 0-based counts of Unicode scalar values, matching the
/// convention used by ESTree `loc` objects. `\r\n`, `\n`, `\r`, U+2028 and U+2029 all end a line.
///
/// Lookups are two binary searches: one over line starts, one over the multi-byte characters.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    /// For each multi-byte character: its end offset and the extra bytes of all characters up
    /// to and including it.
    wide_chars: Vec<(usize, usize)>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut wide_chars = Vec::new();
        let mut extra = 0;
        let mut chars = source.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            let width = c.len_utf8();
            if width > 1 {
                extra += width - 1;
                wide_chars.push((i + width, extra));
            }
            match c {
                '\r' => {
                    if let Some((_, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push(i + 2);
                    } else {
                        line_starts.push(i + 1);
                    }
                }
                '\n' => line_starts.push(i + 1),
                '\u{2028}' | '\u{2029}' => line_starts.push(i + width),
                _ => {}
            }
        }
        Self {
            line_starts,
            wide_chars,
            len: source.len(),
        }
    }

    /// Extra bytes of the multi-byte characters that end at or before `offset`.
    fn extra_bytes_before(&self, offset: usize) -> usize {
        match self.wide_chars.partition_point(|&(end, _)| end <= offset) {
            0 => 0,
            n => self.wide_chars[n - 1].1,
        }
    }

    /// Line/column for a byte offset (clamped to the end of input).
    pub fn line_column(&self, offset: usize) -> LineColumn {
        let offset = offset.min(self.len);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = self.line_starts[line_idx];
        let extra = self.extra_bytes_before(offset) - self.extra_bytes_before(line_start);
        LineColumn {
            line: line_idx as u32 + 1,
            column: (offset - line_start - extra) as u32,
        }
    }

    pub fn location(&self, span: Span, source_file: Option<&str>) -> SourceLocation {
        SourceLocation {
            start: self.line_column(span.start),
            end: self.line_column(span.end),
            source_file: source_file.map(str::to_string),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_is_one_based() {
        let src = "var a;";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_column(4), LineColumn { line: 1, column: 4 });
    }

    #[test]
    fn test_crlf_counts_as_single_break() {
        let src = "a\r\nb\nc";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_count(), 3);
        assert_eq!(idx.line_column(3), LineColumn { line: 2, column: 0 });
        assert_eq!(idx.line_column(5), LineColumn { line: 3, column: 0 });
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        let src = "ab";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_column(99), LineColumn { line: 1, column: 2 });
    }

    #[test]
    fn test_columns_count_scalar_values() {
        let src = "é = 'ü€';\nx\u{2028}😀y";
        let idx = LineIndex::new(src);
        let at = |needle: &str| src.find(needle).unwrap();
        assert_eq!(idx.line_column(at("=")), LineColumn { line: 1, column: 2 });
        assert_eq!(idx.line_column(at(";")), LineColumn { line: 1, column: 8 });
        assert_eq!(idx.line_column(at("x")), LineColumn { line: 2, column: 0 });
        assert_eq!(idx.line_column(at("y")), LineColumn { line: 3, column: 1 });
    }

    #[test]
    fn test_columns_agree_with_char_count() {
        let src = "a\u{e9}b\r\n\u{4e2d}\u{6587} c\n\n\u{1f600}\u{2029}end";
        let idx = LineIndex::new(src);
        let mut line = 1;
        let mut column = 0;
        for (offset, c) in src.char_indices() {
            assert_eq!(idx.line_column(offset), LineColumn { line, column }, "at {offset}");
            let ends_line = matches!(c, '\n' | '\u{2029}') || (c == '\r' && !src[offset + 1..].starts_with('\n'));
            if ends_line {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
    }

    #[test]
    fn test_long_minified_line() {
        let src = "\u{e9};".repeat(100_000);
        let idx = LineIndex::new(&src);
        assert_eq!(idx.line_column(src.len()), LineColumn { line: 1, column: 200_000 });
        assert_eq!(idx.line_column(3), LineColumn { line: 1, column: 2 });
    }
}
