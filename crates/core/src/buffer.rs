// Line-based text buffer and position types.
//
// Columns are char offsets, not byte offsets, so multibyte text never
// lands an edit on a non-boundary index.

use serde::{Deserialize, Serialize};

/// Cursor position in the buffer (row = line index, col = char offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub const fn zero() -> Self {
        Self { row: 0, col: 0 }
    }
}

/// Text buffer with line-based storage.
///
/// Always holds at least one line. Line endings are normalized to `\n`
/// on load; a trailing newline is held as a final empty line, so
/// `as_string` reproduces the loaded content exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Build a buffer from raw file content, normalizing `\r\n` / `\r`.
    ///
    /// Splits on `\n` rather than `str::lines` so content ending in a
    /// newline keeps its final empty line and round-trips byte-for-byte.
    pub fn from_string(content: &str) -> Self {
        let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
        let lines = normalized.split('\n').map(String::from).collect();
        Self { lines }
    }

    pub fn as_string(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    /// Line length in chars.
    pub fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map(|s| s.chars().count()).unwrap_or(0)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Clamp a position onto valid buffer coordinates.
    pub fn clamp(&self, pos: Position) -> Position {
        let row = pos.row.min(self.lines.len() - 1);
        let col = pos.col.min(self.line_len(row));
        Position::new(row, col)
    }

    fn byte_idx(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    /// Insert a character at position. Returns false if out of bounds.
    pub fn insert_char(&mut self, pos: Position, ch: char) -> bool {
        let Some(line) = self.lines.get_mut(pos.row) else {
            return false;
        };
        if pos.col > line.chars().count() {
            return false;
        }
        let idx = Self::byte_idx(line, pos.col);
        line.insert(idx, ch);
        true
    }

    /// Insert a newline at position, splitting the line.
    pub fn insert_newline(&mut self, pos: Position) -> bool {
        let Some(line) = self.lines.get_mut(pos.row) else {
            return false;
        };
        if pos.col > line.chars().count() {
            return false;
        }
        let idx = Self::byte_idx(line, pos.col);
        let rest = line.split_off(idx);
        self.lines.insert(pos.row + 1, rest);
        true
    }

    /// Delete the character at position. At end of line, joins with the
    /// next line instead. Returns false if nothing was deleted.
    pub fn delete_char(&mut self, pos: Position) -> bool {
        if pos.row >= self.lines.len() {
            return false;
        }
        let len = self.line_len(pos.row);
        if pos.col < len {
            let line = &mut self.lines[pos.row];
            let idx = Self::byte_idx(line, pos.col);
            line.remove(idx);
            true
        } else if pos.row + 1 < self.lines.len() {
            let next = self.lines.remove(pos.row + 1);
            self.lines[pos.row].push_str(&next);
            true
        } else {
            false
        }
    }

    /// Extract the text between two positions (start inclusive, end
    /// exclusive). Positions must already be ordered.
    pub fn span_text(&self, start: Position, end: Position) -> String {
        if start.row == end.row {
            let line = self.line(start.row).unwrap_or("");
            return line
                .chars()
                .skip(start.col)
                .take(end.col.saturating_sub(start.col))
                .collect();
        }

        let mut out = String::new();
        if let Some(line) = self.line(start.row) {
            out.extend(line.chars().skip(start.col));
        }
        for row in start.row + 1..end.row {
            out.push('\n');
            out.push_str(self.line(row).unwrap_or(""));
        }
        out.push('\n');
        if let Some(line) = self.line(end.row) {
            out.extend(line.chars().take(end.col));
        }
        out
    }

    /// Remove the span between two ordered positions.
    pub fn remove_span(&mut self, start: Position, end: Position) {
        if start.row >= self.lines.len() {
            return;
        }
        let end = self.clamp(end);

        if start.row == end.row {
            let line = &mut self.lines[start.row];
            let a = Self::byte_idx(line, start.col);
            let b = Self::byte_idx(line, end.col);
            line.replace_range(a..b, "");
            return;
        }

        let tail: String = {
            let last = &self.lines[end.row];
            last.chars().skip(end.col).collect()
        };
        let first = &mut self.lines[start.row];
        let a = Self::byte_idx(first, start.col);
        first.truncate(a);
        first.push_str(&tail);
        self.lines.drain(start.row + 1..=end.row);
    }

    /// Insert possibly multi-line text at position. Returns the position
    /// just past the inserted text.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Position {
        let mut cur = self.clamp(pos);
        for ch in text.chars() {
            if ch == '\n' {
                self.insert_newline(cur);
                cur = Position::new(cur.row + 1, 0);
            } else if ch != '\r' {
                self.insert_char(cur, ch);
                cur.col += 1;
            }
        }
        cur
    }
}
