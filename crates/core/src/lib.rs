// Editor core - text buffer, document, selection, history

pub mod buffer;
pub mod document;
pub mod editor;
pub mod history;

pub use buffer::{Position, TextBuffer};
pub use document::{Document, FileError};
pub use editor::{Editor, SaveOutcome};
