// Undo/redo history over buffer snapshots.
//
// In-session only; cleared on New/Open. Bounded so a long session
// cannot grow without limit.

use crate::buffer::{Position, TextBuffer};

const MAX_UNDO: usize = 200;

/// One restorable editor state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub buffer: TextBuffer,
    pub cursor: Position,
}

#[derive(Debug, Default)]
pub struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record state before a mutation. Clears the redo stack.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo.push(snapshot);
        if self.undo.len() > MAX_UNDO {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    /// Pop the last undo state, stashing `current` for redo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let prev = self.undo.pop()?;
        self.redo.push(current);
        Some(prev)
    }

    /// Pop the last redo state, stashing `current` for undo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(text: &str) -> Snapshot {
        Snapshot {
            buffer: TextBuffer::from_string(text),
            cursor: Position::zero(),
        }
    }

    #[test]
    fn undo_then_redo() {
        let mut h = History::new();
        h.push(snap("v1"));

        let restored = h.undo(snap("v2")).unwrap();
        assert_eq!(restored.buffer.as_string(), "v1");
        assert!(h.can_redo());

        let forward = h.redo(snap("v1")).unwrap();
        assert_eq!(forward.buffer.as_string(), "v2");
        assert!(h.can_undo());
    }

    #[test]
    fn push_clears_redo() {
        let mut h = History::new();
        h.push(snap("v1"));
        h.undo(snap("v2")).unwrap();
        assert!(h.can_redo());

        h.push(snap("v1"));
        assert!(!h.can_redo());
    }

    #[test]
    fn undo_on_empty_history() {
        let mut h = History::new();
        assert!(h.undo(snap("x")).is_none());
        // A failed undo must not pollute the redo stack
        assert!(!h.can_redo());
    }

    #[test]
    fn history_is_bounded() {
        let mut h = History::new();
        for i in 0..500 {
            h.push(snap(&i.to_string()));
        }
        let mut count = 0;
        while h.undo(snap("cur")).is_some() {
            count += 1;
        }
        assert_eq!(count, MAX_UNDO);
    }
}
