//! Text model primitives: sizes, ranges, and line/column conversion.

pub use text_size::{TextRange, TextSize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Pre-computed line start offsets for a particular text snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    line_ends: Vec<TextSize>,
    text_len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = Vec::with_capacity(64);
        let mut line_ends = Vec::with_capacity(64);
        line_starts.push(TextSize::from(0));

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_ends.push(TextSize::from(i as u32));
                    line_starts.push(TextSize::from((i + 1) as u32));
                    i += 1;
                }
                b'\r' => {
                    line_ends.push(TextSize::from(i as u32));
                    let next = if bytes.get(i + 1) == Some(&b'\n') { i + 2 } else { i + 1 };
                    line_starts.push(TextSize::from(next as u32));
                    i = next;
                }
                _ => i += 1,
            }
        }

        line_ends.push(TextSize::from(text.len() as u32));

        Self {
            line_starts,
            line_ends,
            text_len: TextSize::from(text.len() as u32),
        }
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.text_len
    }

    #[inline]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    fn line_index(&self, offset: TextSize) -> usize {
        // Offsets past the end are clamped; callers pass `text_len` to mean EOF.
        let offset = offset.min(self.text_len);
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert.saturating_sub(1),
        }
    }

    /// Convert a byte offset to a (zero-based) line/column pair.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.text_len);
        let line = self.line_index(offset);
        let col = offset.min(self.line_ends[line]) - self.line_starts[line];
        LineCol {
            line: line as u32,
            col: u32::from(col),
        }
    }

    /// Whether `offset` sits at the end of its line (on the line terminator) or at EOF.
    ///
    /// Zero-length diagnostics placed there are rendered after the last character of the line.
    pub fn is_line_end(&self, offset: TextSize) -> bool {
        if offset >= self.text_len {
            return true;
        }
        let line = self.line_index(offset);
        self.line_ends[line] == offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_handles_mixed_terminators() {
        let text = "ab\r\ncd\ne";
        let index = LineIndex::new(text);

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_col(TextSize::from(0)), LineCol { line: 0, col: 0 });
        assert_eq!(index.line_col(TextSize::from(4)), LineCol { line: 1, col: 0 });
        assert_eq!(index.line_col(TextSize::from(8)), LineCol { line: 2, col: 1 });
    }

    #[test]
    fn line_end_detection() {
        let text = "case 1\nx";
        let index = LineIndex::new(text);

        assert!(index.is_line_end(TextSize::from(6)));
        assert!(!index.is_line_end(TextSize::from(5)));
        assert!(index.is_line_end(TextSize::from(8)));
    }
}
