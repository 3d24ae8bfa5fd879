// Document - file path + text buffer + dirty flag.
//
// One filesystem operation per call, no retries. Load failures never
// touch existing state: `load` builds a fresh Document and callers only
// swap it in on success.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::buffer::TextBuffer;

/// Filesystem failure while loading or saving a document.
#[derive(Debug)]
pub enum FileError {
    /// Could not read the file (missing, permission, ...)
    Read(PathBuf, String),
    /// Could not write the file
    Write(PathBuf, String),
    /// File content is not valid UTF-8
    Utf8(PathBuf),
    /// Save called on an untitled document
    NoPath,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::Read(path, msg) => {
                write!(f, "Failed to open {}: {}", path.display(), msg)
            }
            FileError::Write(path, msg) => {
                write!(f, "Failed to save {}: {}", path.display(), msg)
            }
            FileError::Utf8(path) => {
                write!(f, "{} is not valid UTF-8 text", path.display())
            }
            FileError::NoPath => {
                write!(f, "No file path set; use Save As")
            }
        }
    }
}

impl std::error::Error for FileError {}

/// An open document: optional backing path plus the in-memory buffer.
///
/// `path` stays `None` until the first successful save or open.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: Option<PathBuf>,
    pub buffer: TextBuffer,
    dirty: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty untitled document.
    pub fn new() -> Self {
        Self {
            path: None,
            buffer: TextBuffer::new(),
            dirty: false,
        }
    }

    /// Read a file as UTF-8 text into a new document.
    ///
    /// `fs::read` + explicit UTF-8 validation so a decode failure is
    /// reported as `FileError::Utf8` rather than a generic read error.
    pub fn load(path: &Path) -> Result<Self, FileError> {
        let bytes = fs::read(path)
            .map_err(|e| FileError::Read(path.to_path_buf(), e.to_string()))?;
        let content = String::from_utf8(bytes)
            .map_err(|_| FileError::Utf8(path.to_path_buf()))?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            buffer: TextBuffer::from_string(&content),
            dirty: false,
        })
    }

    /// Write the buffer to the stored path. Untitled documents get
    /// `FileError::NoPath`; route them through `save_as`.
    pub fn save(&mut self) -> Result<(), FileError> {
        let Some(path) = self.path.clone() else {
            return Err(FileError::NoPath);
        };
        self.write_to(&path)?;
        self.dirty = false;
        Ok(())
    }

    /// Write the buffer to `path` and adopt it as the document path.
    pub fn save_as(&mut self, path: &Path) -> Result<(), FileError> {
        self.write_to(path)?;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<(), FileError> {
        fs::write(path, self.buffer.as_string())
            .map_err(|e| FileError::Write(path.to_path_buf(), e.to_string()))
    }

    pub fn has_path(&self) -> bool {
        self.path.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// File name for the title bar, or "untitled".
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_is_untitled_and_empty() {
        let doc = Document::new();
        assert!(doc.path.is_none());
        assert!(doc.buffer.is_empty());
        assert!(!doc.is_dirty());
        assert_eq!(doc.display_name(), "untitled");
    }

    #[test]
    fn save_as_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");

        let mut doc = Document::new();
        doc.buffer = TextBuffer::from_string("alpha\nbeta\ngamma");
        doc.mark_dirty();
        doc.save_as(&path).unwrap();
        assert_eq!(doc.path.as_deref(), Some(path.as_path()));
        assert!(!doc.is_dirty());

        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.buffer.as_string(), "alpha\nbeta\ngamma");
    }

    #[test]
    fn round_trip_empty_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");

        let mut doc = Document::new();
        doc.save_as(&path).unwrap();

        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.buffer.as_string(), "");
    }

    #[test]
    fn load_normalizes_mixed_newlines_and_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.txt");
        fs::write(&path, "one\r\ntwo\nthree\r\n").unwrap();

        let mut doc = Document::load(&path).unwrap();
        assert_eq!(doc.buffer.as_string(), "one\ntwo\nthree\n");

        // Normalized form round-trips unchanged
        doc.save().unwrap();
        let again = Document::load(&path).unwrap();
        assert_eq!(again.buffer.as_string(), "one\ntwo\nthree\n");
    }

    #[test]
    fn trailing_blank_line_survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");

        let mut doc = Document::new();
        doc.buffer = TextBuffer::from_string("a\n");
        doc.save_as(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\n");

        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.buffer.as_string(), "a\n");
    }

    #[test]
    fn open_then_save_keeps_final_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posix.txt");
        fs::write(&path, "hello\n").unwrap();

        let mut doc = Document::load(&path).unwrap();
        doc.save().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn save_untitled_is_an_error() {
        let mut doc = Document::new();
        let err = doc.save().unwrap_err();
        assert!(matches!(err, FileError::NoPath));
        assert_eq!(err.to_string(), "No file path set; use Save As");
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::load(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, FileError::Read(_, _)));
    }

    #[test]
    fn load_non_utf8_is_utf8_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.dat");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = Document::load(&path).unwrap_err();
        assert!(matches!(err, FileError::Utf8(_)));
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn save_to_unwritable_path_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::new();
        // Directory component does not exist
        let err = doc
            .save_as(&dir.path().join("no/such/dir/f.txt"))
            .unwrap_err();
        assert!(matches!(err, FileError::Write(_, _)));
        // Failed save_as must not adopt the path
        assert!(doc.path.is_none());
    }
}
