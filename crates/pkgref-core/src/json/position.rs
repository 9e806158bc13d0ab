//! Cursor positions in raw manifest text.

use super::ast::CodeRange;

/// Convert line/column to byte offset and vice versa.
#[derive(Debug)]
pub struct LineIndex {
    /// Byte offsets of the start of each line.
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Build a line index from source text.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Convert a byte offset to line and column (both 0-indexed, column in bytes).
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        (line, offset - self.line_starts[line])
    }

    /// Convert a 0-indexed line and character column to a byte offset.
    ///
    /// Columns count Unicode scalar values and are clamped to the end of
    /// the line. Returns `None` when `line` is past the last line.
    #[must_use]
    pub fn offset(&self, source: &str, line: usize, column: usize) -> Option<usize> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(self.len, |next| next - 1);
        let text = source.get(start..end)?;
        let within = text
            .char_indices()
            .nth(column)
            .map_or(text.len(), |(i, _)| i);
        Some(start + within)
    }

    /// Get the total number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Find the quoted token under `offset` and return the range between its quotes.
///
/// Tokens are scanned left to right on the line containing `offset`, the way
/// an editor applies the word pattern `"[^\s]+?"`: a token opens at a quote,
/// needs at least one non-space character, and closes at the next quote.
/// The offset may sit anywhere from the opening quote to just past the
/// closing quote.
#[must_use]
pub fn quoted_token_at(source: &str, offset: usize) -> Option<CodeRange> {
    let bytes = source.as_bytes();
    if offset > bytes.len() {
        return None;
    }

    let line_start = bytes[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let line_end = bytes[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |i| offset + i);

    let mut i = line_start;
    while i < line_end {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }

        // The first content byte may itself be a quote; the token then ends
        // at the next quote after it.
        let first = i + 1;
        if first >= line_end || is_space(bytes[first]) {
            i += 1;
            continue;
        }

        let mut close = first + 1;
        while close < line_end && bytes[close] != b'"' && !is_space(bytes[close]) {
            close += 1;
        }
        if close >= line_end || bytes[close] != b'"' {
            i += 1;
            continue;
        }

        if (i..=close + 1).contains(&offset) {
            return Some(CodeRange::new(first, close));
        }
        i = close + 1;
    }

    None
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}
