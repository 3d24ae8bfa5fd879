// Editor session - one document, cursor/selection, undo history.
//
// This is the seam the interactive surface drives: one method per user
// intent (new/open/save/save_as plus the editing operations), explicit
// inputs and results, no widget state leaking in.

use std::path::Path;

use crate::buffer::{Position, TextBuffer};
use crate::document::{Document, FileError};
use crate::history::{History, Snapshot};

/// Result of a Save intent.
#[derive(Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Untitled document: the caller must prompt for a destination and
    /// call `save_as`.
    NeedsPath,
}

pub struct Editor {
    pub document: Document,
    cursor: Position,
    /// Selection anchor; selection is the span between anchor and cursor.
    anchor: Option<Position>,
    history: History,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            cursor: Position::zero(),
            anchor: None,
            history: History::new(),
        }
    }

    // =====================================================================
    // File intents
    // =====================================================================

    /// New: clear buffer, path, selection, history.
    pub fn new_file(&mut self) {
        self.document = Document::new();
        self.cursor = Position::zero();
        self.anchor = None;
        self.history.clear();
    }

    /// Open: replace the document on success, leave everything
    /// untouched on failure.
    pub fn open(&mut self, path: &Path) -> Result<(), FileError> {
        let doc = Document::load(path)?;
        self.document = doc;
        self.cursor = Position::zero();
        self.anchor = None;
        self.history.clear();
        Ok(())
    }

    pub fn save(&mut self) -> Result<SaveOutcome, FileError> {
        if !self.document.has_path() {
            return Ok(SaveOutcome::NeedsPath);
        }
        self.document.save()?;
        Ok(SaveOutcome::Saved)
    }

    pub fn save_as(&mut self, path: &Path) -> Result<(), FileError> {
        self.document.save_as(path)
    }

    // =====================================================================
    // Cursor and selection
    // =====================================================================

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    fn buffer(&self) -> &TextBuffer {
        &self.document.buffer
    }

    /// Ordered selection span, or None when nothing is selected.
    pub fn selection(&self) -> Option<(Position, Position)> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        if anchor < self.cursor {
            Some((anchor, self.cursor))
        } else {
            Some((self.cursor, anchor))
        }
    }

    /// The highlighted text, if any.
    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.selection()?;
        Some(self.buffer().span_text(start, end))
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    pub fn select_all(&mut self) {
        let last = self.buffer().line_count() - 1;
        self.anchor = Some(Position::zero());
        self.cursor = Position::new(last, self.buffer().line_len(last));
    }

    fn begin_move(&mut self, select: bool) {
        if select {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
    }

    pub fn move_left(&mut self, select: bool) {
        self.begin_move(select);
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.buffer().line_len(self.cursor.row);
        }
    }

    pub fn move_right(&mut self, select: bool) {
        self.begin_move(select);
        if self.cursor.col < self.buffer().line_len(self.cursor.row) {
            self.cursor.col += 1;
        } else if self.cursor.row + 1 < self.buffer().line_count() {
            self.cursor.row += 1;
            self.cursor.col = 0;
        }
    }

    pub fn move_up(&mut self, select: bool) {
        self.begin_move(select);
        if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.cursor.col.min(self.buffer().line_len(self.cursor.row));
        } else {
            self.cursor.col = 0;
        }
    }

    pub fn move_down(&mut self, select: bool) {
        self.begin_move(select);
        if self.cursor.row + 1 < self.buffer().line_count() {
            self.cursor.row += 1;
            self.cursor.col = self.cursor.col.min(self.buffer().line_len(self.cursor.row));
        } else {
            self.cursor.col = self.buffer().line_len(self.cursor.row);
        }
    }

    pub fn move_home(&mut self, select: bool) {
        self.begin_move(select);
        self.cursor.col = 0;
    }

    pub fn move_end(&mut self, select: bool) {
        self.begin_move(select);
        self.cursor.col = self.buffer().line_len(self.cursor.row);
    }

    pub fn move_page(&mut self, delta_rows: isize, select: bool) {
        self.begin_move(select);
        let row = if delta_rows < 0 {
            self.cursor.row.saturating_sub(delta_rows.unsigned_abs())
        } else {
            (self.cursor.row + delta_rows as usize).min(self.buffer().line_count() - 1)
        };
        self.cursor.row = row;
        self.cursor.col = self.cursor.col.min(self.buffer().line_len(row));
    }

    // =====================================================================
    // Editing
    // =====================================================================

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            buffer: self.document.buffer.clone(),
            cursor: self.cursor,
        }
    }

    fn checkpoint(&mut self) {
        let snap = self.snapshot();
        self.history.push(snap);
    }

    /// Remove the active selection, if any, placing the cursor at its
    /// start. Assumes a checkpoint was already taken.
    fn delete_selection_inner(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            return false;
        };
        self.document.buffer.remove_span(start, end);
        self.cursor = start;
        self.anchor = None;
        self.document.mark_dirty();
        true
    }

    pub fn insert_char(&mut self, ch: char) {
        self.checkpoint();
        self.delete_selection_inner();
        if self.document.buffer.insert_char(self.cursor, ch) {
            self.cursor.col += 1;
            self.document.mark_dirty();
        }
    }

    pub fn insert_newline(&mut self) {
        self.checkpoint();
        self.delete_selection_inner();
        if self.document.buffer.insert_newline(self.cursor) {
            self.cursor = Position::new(self.cursor.row + 1, 0);
            self.document.mark_dirty();
        }
    }

    pub fn backspace(&mut self) {
        if self.selection().is_some() {
            self.checkpoint();
            self.delete_selection_inner();
            return;
        }
        // Nothing before the cursor: no edit, no checkpoint
        if self.cursor.row == 0 && self.cursor.col == 0 {
            return;
        }
        self.checkpoint();
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        } else {
            self.cursor.row -= 1;
            self.cursor.col = self.buffer().line_len(self.cursor.row);
        }
        if self.document.buffer.delete_char(self.cursor) {
            self.document.mark_dirty();
        }
    }

    pub fn delete_forward(&mut self) {
        if self.selection().is_some() {
            self.checkpoint();
            self.delete_selection_inner();
            return;
        }
        // Nothing after the cursor: no edit, no checkpoint
        let last = self.buffer().line_count() - 1;
        if self.cursor.row == last && self.cursor.col == self.buffer().line_len(last) {
            return;
        }
        self.checkpoint();
        if self.document.buffer.delete_char(self.cursor) {
            self.document.mark_dirty();
        }
    }

    /// Copy: returns the selected text without modifying the buffer.
    pub fn copy(&self) -> Option<String> {
        self.selected_text()
    }

    /// Cut: returns the selected text and removes it.
    pub fn cut(&mut self) -> Option<String> {
        let text = self.selected_text()?;
        self.checkpoint();
        self.delete_selection_inner();
        Some(text)
    }

    /// Paste: replaces the selection (if any) with `text`.
    pub fn paste(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.checkpoint();
        self.delete_selection_inner();
        self.cursor = self.document.buffer.insert_text(self.cursor, text);
        self.document.mark_dirty();
    }

    // =====================================================================
    // Undo / redo
    // =====================================================================

    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(snap) => {
                self.restore(snap);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(snap) => {
                self.restore(snap);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        if self.document.buffer != snap.buffer {
            self.document.mark_dirty();
        }
        self.document.buffer = snap.buffer;
        self.cursor = self.document.buffer.clamp(snap.cursor);
        self.anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(text: &str) -> Editor {
        let mut ed = Editor::new();
        ed.document.buffer = TextBuffer::from_string(text);
        ed
    }

    #[test]
    fn typing_inserts_and_marks_dirty() {
        let mut ed = Editor::new();
        ed.insert_char('h');
        ed.insert_char('i');
        assert_eq!(ed.document.buffer.as_string(), "hi");
        assert_eq!(ed.cursor(), Position::new(0, 2));
        assert!(ed.document.is_dirty());
    }

    #[test]
    fn new_file_resets_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");

        let mut ed = Editor::new();
        ed.insert_char('x');
        ed.save_as(&path).unwrap();
        assert!(ed.document.has_path());

        ed.new_file();
        assert!(ed.document.path.is_none());
        assert!(ed.document.buffer.is_empty());
        assert_eq!(ed.cursor(), Position::zero());
        assert!(!ed.undo());
    }

    #[test]
    fn save_untitled_needs_path() {
        let mut ed = Editor::new();
        ed.insert_char('x');
        assert_eq!(ed.save().unwrap(), SaveOutcome::NeedsPath);
    }

    #[test]
    fn save_after_save_as_reuses_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");

        let mut ed = Editor::new();
        ed.insert_char('a');
        ed.save_as(&path).unwrap();
        ed.insert_char('b');
        assert_eq!(ed.save().unwrap(), SaveOutcome::Saved);

        let mut check = Editor::new();
        check.open(&path).unwrap();
        assert_eq!(check.document.buffer.as_string(), "ab");
    }

    #[test]
    fn failed_open_leaves_state_unchanged() {
        let mut ed = Editor::new();
        ed.insert_char('x');
        let before = ed.document.buffer.as_string();

        let dir = tempfile::tempdir().unwrap();
        assert!(ed.open(&dir.path().join("missing.txt")).is_err());
        assert_eq!(ed.document.buffer.as_string(), before);
        assert_eq!(ed.cursor(), Position::new(0, 1));
    }

    #[test]
    fn shift_movement_builds_selection() {
        let mut ed = editor_with("hello world");
        ed.move_home(false);
        for _ in 0..5 {
            ed.move_right(true);
        }
        assert_eq!(ed.selected_text().as_deref(), Some("hello"));

        // Plain movement drops the selection
        ed.move_right(false);
        assert!(ed.selected_text().is_none());
    }

    #[test]
    fn selection_is_ordered_both_directions() {
        let mut ed = editor_with("abcdef");
        ed.move_end(false);
        ed.move_left(true);
        ed.move_left(true);
        assert_eq!(ed.selected_text().as_deref(), Some("ef"));
    }

    #[test]
    fn select_all_spans_buffer() {
        let mut ed = editor_with("one\ntwo");
        ed.select_all();
        assert_eq!(ed.selected_text().as_deref(), Some("one\ntwo"));
    }

    #[test]
    fn typing_replaces_selection() {
        let mut ed = editor_with("hello");
        ed.select_all();
        ed.insert_char('x');
        assert_eq!(ed.document.buffer.as_string(), "x");
    }

    #[test]
    fn cut_copy_paste() {
        let mut ed = editor_with("hello world");
        ed.move_home(false);
        for _ in 0..5 {
            ed.move_right(true);
        }

        assert_eq!(ed.copy().as_deref(), Some("hello"));
        assert_eq!(ed.document.buffer.as_string(), "hello world");

        let cut = ed.cut().unwrap();
        assert_eq!(cut, "hello");
        assert_eq!(ed.document.buffer.as_string(), " world");

        ed.move_end(false);
        ed.paste(&cut);
        assert_eq!(ed.document.buffer.as_string(), " worldhello");
    }

    #[test]
    fn cut_without_selection_is_none() {
        let mut ed = editor_with("abc");
        assert!(ed.cut().is_none());
        assert_eq!(ed.document.buffer.as_string(), "abc");
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut ed = Editor::new();
        ed.insert_char('a');
        ed.insert_char('b');
        assert_eq!(ed.document.buffer.as_string(), "ab");

        assert!(ed.undo());
        assert_eq!(ed.document.buffer.as_string(), "a");
        assert!(ed.undo());
        assert_eq!(ed.document.buffer.as_string(), "");
        assert!(!ed.undo());

        assert!(ed.redo());
        assert!(ed.redo());
        assert_eq!(ed.document.buffer.as_string(), "ab");
        assert!(!ed.redo());
    }

    #[test]
    fn noop_deletes_record_no_history_and_stay_clean() {
        let mut ed = editor_with("x");
        ed.move_home(false);
        ed.backspace();
        ed.move_end(false);
        ed.delete_forward();

        assert_eq!(ed.document.buffer.as_string(), "x");
        assert!(!ed.document.is_dirty());
        // Nothing changed, so undo has nothing to offer and cannot
        // flag the document dirty
        assert!(!ed.undo());
        assert!(!ed.document.is_dirty());
    }

    #[test]
    fn backspace_joins_lines() {
        let mut ed = editor_with("ab\ncd");
        ed.move_down(false);
        ed.move_home(false);
        ed.backspace();
        assert_eq!(ed.document.buffer.as_string(), "abcd");
        assert_eq!(ed.cursor(), Position::new(0, 2));
    }
}
