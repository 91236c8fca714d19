use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Position of a span's start within its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo<'src> {
    /// 1-based line number.
    pub line: usize,
    /// 1-based byte column.
    pub column: usize,
    /// The full text of the line, without its terminator.
    pub line_text: &'src [u8],
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Returns None if the span does not fit in `source`.
    pub fn as_str<'src>(&self, source: &'src [u8]) -> Option<&'src [u8]> {
        source.get(self.start..self.end)
    }

    pub fn line_info<'src>(&self, source: &'src [u8]) -> Option<LineInfo<'src>> {
        if self.start > source.len() {
            return None;
        }
        let before = &source[..self.start];
        let line = memchr::memchr_iter(b'\n', before).count() + 1;
        let line_start = memchr::memrchr(b'\n', before).map_or(0, |i| i + 1);
        let line_end = memchr::memchr(b'\n', &source[self.start..])
            .map_or(source.len(), |i| self.start + i);
        let mut line_text = &source[line_start..line_end];
        if line_text.last() == Some(&b'\r') {
            line_text = &line_text[..line_text.len() - 1];
        }
        Some(LineInfo {
            line,
            column: self.start - line_start + 1,
            line_text,
        })
    }

    /// 1-based line of the span start, 0 when the span lies outside `source`.
    pub fn line(&self, source: &[u8]) -> usize {
        self.line_info(source).map_or(0, |info| info.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_line_and_column() {
        let source = b"<?php\n$a = 1;\n  $b;\n";
        let span = Span::new(16, 18);
        let info = span.line_info(source).unwrap();
        assert_eq!(info.line, 3);
        assert_eq!(info.column, 3);
        assert_eq!(info.line_text, b"  $b;");
    }

    #[test]
    fn first_line_has_column_one() {
        let info = Span::new(0, 5).line_info(b"<?php").unwrap();
        assert_eq!((info.line, info.column), (1, 1));
    }

    #[test]
    fn out_of_bounds_span_has_no_line() {
        assert!(Span::new(10, 12).line_info(b"abc").is_none());
        assert_eq!(Span::new(10, 12).line(b"abc"), 0);
        assert!(Span::new(1, 9).as_str(b"abc").is_none());
    }

    #[test]
    fn join_covers_both() {
        assert_eq!(Span::new(4, 6).join(Span::new(1, 3)), Span::new(1, 6));
    }
}
