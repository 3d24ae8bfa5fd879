//! Interactive editor TUI.
//!
//! One screen: title bar, text area, status line. The Ask AI popup
//! runs the gateway call on a worker thread and receives the single
//! QueryResult over an mpsc channel polled from the event loop, so the
//! waiting indicator keeps rendering while the call blocks.

mod draw;

use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use unicode_width::UnicodeWidthChar;

use quill_config::Settings;
use quill_core::{Editor, SaveOutcome};
use quill_llm_client::{LlmClient, QueryResult};

use crate::preflight::{prepare_query, PreflightError};
use crate::CliError;

const PAGE_JUMP: isize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Open,
    SaveAs,
}

impl PromptKind {
    fn label(self) -> &'static str {
        match self {
            PromptKind::Open => "Open",
            PromptKind::SaveAs => "Save as",
        }
    }
}

enum Mode {
    Edit,
    /// Path prompt on the status line
    Prompt { kind: PromptKind, input: String },
    /// Ask AI popup
    Ask,
}

/// State of the Ask AI popup. The selection is captured once, when the
/// popup opens; editing underneath it is not possible while it is up.
struct AskState {
    selected_text: String,
    question: String,
    answer: Option<String>,
    scroll: u16,
}

struct EditorApp {
    editor: Editor,
    client: LlmClient,
    tab_width: usize,
    /// Internal cut/copy register
    register: String,
    /// Suggested destination for Save As (file argument that did not exist yet)
    suggested_path: Option<PathBuf>,
    scroll_row: usize,
    scroll_col: usize,
    show_status_bar: bool,
    mode: Mode,
    ask: Option<AskState>,
    /// In-flight query; at most one. Submit is refused while set.
    pending: Option<Receiver<QueryResult>>,
    notice: Option<String>,
    show_help: bool,
    quit_armed: bool,
    should_quit: bool,
}

impl EditorApp {
    fn new(editor: Editor, client: LlmClient, tab_width: usize) -> Self {
        Self {
            editor,
            client,
            tab_width,
            register: String::new(),
            suggested_path: None,
            scroll_row: 0,
            scroll_col: 0,
            show_status_bar: true,
            mode: Mode::Edit,
            ask: None,
            pending: None,
            notice: None,
            show_help: false,
            quit_armed: false,
            should_quit: false,
        }
    }

    fn notify(&mut self, msg: impl Into<String>) {
        self.notice = Some(msg.into());
    }

    /// The status line stays visible during a path prompt even when the
    /// user has hidden it; the prompt has nowhere else to live.
    fn status_visible(&self) -> bool {
        self.show_status_bar || matches!(self.mode, Mode::Prompt { .. })
    }

    /// Rows taken by the title bar and (if shown) status line.
    fn chrome_rows(&self) -> u16 {
        1 + u16::from(self.status_visible())
    }

    // =====================================================================
    // Ask AI flow
    // =====================================================================

    fn open_ask_popup(&mut self) {
        match self.editor.selected_text() {
            Some(text) => {
                self.ask = Some(AskState {
                    selected_text: text,
                    question: String::new(),
                    answer: None,
                    scroll: 0,
                });
                self.mode = Mode::Ask;
            }
            None => self.notify(PreflightError::NoSelection.to_string()),
        }
    }

    fn submit_ask(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(ask) = &mut self.ask else {
            return;
        };

        let query = match prepare_query(Some(&ask.selected_text), &ask.question) {
            Ok(q) => q,
            Err(e) => {
                self.notify(e.to_string());
                return;
            }
        };

        ask.answer = None;
        ask.scroll = 0;

        let client = self.client.clone();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(client.ask(&query.selected_text, &query.question));
        });
        self.pending = Some(rx);
    }

    /// Poll the in-flight query without blocking the event loop.
    fn poll_pending(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        let delivered = match rx.try_recv() {
            Ok(result) => match result {
                QueryResult::Answer(text) => text,
                // Failure text goes into the answer area, not a dialog
                QueryResult::Failure(msg) => msg,
            },
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                "Error contacting LLM:\nworker thread exited unexpectedly".to_string()
            }
        };
        self.pending = None;
        if let Some(ask) = &mut self.ask {
            ask.answer = Some(delivered);
            ask.scroll = 0;
        }
    }

    // =====================================================================
    // Key handling
    // =====================================================================

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.notice = None;

        if self.show_help {
            // Any key dismisses help
            self.show_help = false;
            return;
        }

        // A second Ctrl-Q confirms quitting with unsaved changes
        let was_armed = self.quit_armed;
        self.quit_armed = false;

        match self.mode {
            Mode::Edit => self.handle_edit_key(key, was_armed),
            Mode::Prompt { .. } => self.handle_prompt_key(key),
            Mode::Ask => self.handle_ask_key(key),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent, quit_was_armed: bool) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let select = key.modifiers.contains(KeyModifiers::SHIFT);

        if ctrl {
            match key.code {
                KeyCode::Char('q') => {
                    if self.editor.document.is_dirty() && !quit_was_armed {
                        self.quit_armed = true;
                        self.notify("Unsaved changes - press Ctrl-Q again to quit");
                    } else {
                        self.should_quit = true;
                    }
                }
                KeyCode::Char('n') => {
                    self.editor.new_file();
                    self.scroll_row = 0;
                    self.scroll_col = 0;
                    self.notify("New file");
                }
                KeyCode::Char('o') => {
                    self.mode = Mode::Prompt {
                        kind: PromptKind::Open,
                        input: String::new(),
                    };
                }
                KeyCode::Char('s') => self.save(),
                KeyCode::Char('w') => self.open_save_as_prompt(),
                KeyCode::Char('z') => {
                    if !self.editor.undo() {
                        self.notify("Nothing to undo");
                    }
                }
                KeyCode::Char('y') => {
                    if !self.editor.redo() {
                        self.notify("Nothing to redo");
                    }
                }
                KeyCode::Char('x') => match self.editor.cut() {
                    Some(text) => self.register = text,
                    None => self.notify(PreflightError::NoSelection.to_string()),
                },
                KeyCode::Char('c') => match self.editor.copy() {
                    Some(text) => self.register = text,
                    None => self.notify(PreflightError::NoSelection.to_string()),
                },
                KeyCode::Char('v') => {
                    if self.register.is_empty() {
                        self.notify("Register is empty");
                    } else {
                        let text = self.register.clone();
                        self.editor.paste(&text);
                    }
                }
                KeyCode::Char('a') => self.editor.select_all(),
                KeyCode::Char('k') => self.open_ask_popup(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::F(1) => self.show_help = true,
            KeyCode::Up => self.editor.move_up(select),
            KeyCode::Down => self.editor.move_down(select),
            KeyCode::Left => self.editor.move_left(select),
            KeyCode::Right => self.editor.move_right(select),
            KeyCode::Home => self.editor.move_home(select),
            KeyCode::End => self.editor.move_end(select),
            KeyCode::PageUp => self.editor.move_page(-PAGE_JUMP, select),
            KeyCode::PageDown => self.editor.move_page(PAGE_JUMP, select),
            KeyCode::Enter => self.editor.insert_newline(),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete_forward(),
            KeyCode::Tab => {
                for _ in 0..self.tab_width {
                    self.editor.insert_char(' ');
                }
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::ALT) => {
                self.editor.insert_char(ch);
            }
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Mode::Prompt { kind, input } = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.mode = Mode::Edit,
            KeyCode::Enter => {
                let kind = *kind;
                let path = input.trim().to_string();
                self.mode = Mode::Edit;
                if path.is_empty() {
                    self.notify("No path given");
                    return;
                }
                match kind {
                    PromptKind::Open => self.open_path(Path::new(&path)),
                    PromptKind::SaveAs => self.save_as_path(Path::new(&path)),
                }
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                input.push(ch);
            }
            _ => {}
        }
    }

    fn handle_ask_key(&mut self, key: KeyEvent) {
        // No cancellation: while a query is in flight the popup only
        // shows the waiting indicator.
        if self.pending.is_some() {
            return;
        }
        let Some(ask) = &mut self.ask else {
            self.mode = Mode::Edit;
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.ask = None;
                self.mode = Mode::Edit;
            }
            KeyCode::Enter => self.submit_ask(),
            KeyCode::Backspace => {
                ask.question.pop();
            }
            KeyCode::Up => ask.scroll = ask.scroll.saturating_sub(1),
            KeyCode::Down => ask.scroll = ask.scroll.saturating_add(1),
            KeyCode::PageUp => ask.scroll = ask.scroll.saturating_sub(10),
            KeyCode::PageDown => ask.scroll = ask.scroll.saturating_add(10),
            KeyCode::Char('v') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let register = self.register.clone();
                ask.question.push_str(&register);
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                ask.question.push(ch);
            }
            _ => {}
        }
    }

    // =====================================================================
    // File intents
    // =====================================================================

    fn save(&mut self) {
        match self.editor.save() {
            Ok(SaveOutcome::Saved) => {
                let name = self.editor.document.display_name();
                self.notify(format!("Saved {}", name));
            }
            Ok(SaveOutcome::NeedsPath) => self.open_save_as_prompt(),
            Err(e) => self.notify(e.to_string()),
        }
    }

    fn open_save_as_prompt(&mut self) {
        let prefill = self
            .editor
            .document
            .path
            .clone()
            .or_else(|| self.suggested_path.clone())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.mode = Mode::Prompt {
            kind: PromptKind::SaveAs,
            input: prefill,
        };
    }

    fn open_path(&mut self, path: &Path) {
        match self.editor.open(path) {
            Ok(()) => {
                self.scroll_row = 0;
                self.scroll_col = 0;
                let name = self.editor.document.display_name();
                self.notify(format!("Opened {}", name));
            }
            Err(e) => self.notify(e.to_string()),
        }
    }

    fn save_as_path(&mut self, path: &Path) {
        match self.editor.save_as(path) {
            Ok(()) => {
                let name = self.editor.document.display_name();
                self.notify(format!("Saved {}", name));
            }
            Err(e) => self.notify(e.to_string()),
        }
    }

    // =====================================================================
    // Scrolling
    // =====================================================================

    fn ensure_visible(&mut self, visible_rows: usize, area_width: u16) {
        let cursor = self.editor.cursor();

        if cursor.row < self.scroll_row {
            self.scroll_row = cursor.row;
        }
        if visible_rows > 0 && cursor.row >= self.scroll_row + visible_rows {
            self.scroll_row = cursor.row - visible_rows + 1;
        }

        if cursor.col < self.scroll_col {
            self.scroll_col = cursor.col;
        }
        let available = area_width.max(1) as usize;
        let line = self.editor.document.buffer.line(cursor.row).unwrap_or("");
        while display_width(line, self.scroll_col, cursor.col) >= available {
            self.scroll_col += 1;
        }
    }
}

/// Display width of the char range [from, to) of a line.
fn display_width(line: &str, from: usize, to: usize) -> usize {
    line.chars()
        .skip(from)
        .take(to.saturating_sub(from))
        .map(|ch| ch.width().unwrap_or(0))
        .sum()
}

// =========================================================================
// Entry point
// =========================================================================

/// Run the editor, optionally opening a file first.
pub fn run(file: Option<PathBuf>) -> Result<(), CliError> {
    let settings = Settings::load();
    let client = LlmClient::new(
        settings.ai.effective_endpoint(),
        settings.ai.effective_model(),
    );

    let mut editor = Editor::new();
    let mut app = match file {
        Some(path) if path.exists() => {
            editor
                .open(&path)
                .map_err(|e| CliError::io(e.to_string()))?;
            EditorApp::new(editor, client, settings.tab_width)
        }
        Some(path) => {
            // New file: created on first save
            let mut app = EditorApp::new(editor, client, settings.tab_width);
            app.notify(format!("{} (new file)", path.display()));
            app.suggested_path = Some(path);
            app
        }
        None => EditorApp::new(editor, client, settings.tab_width),
    };
    app.show_status_bar = settings.show_status_bar;

    run_app(&mut app)
}

fn run_app(app: &mut EditorApp) -> Result<(), CliError> {
    terminal::enable_raw_mode()
        .map_err(|e| CliError::general(format!("failed to enable raw mode: {}", e)))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| CliError::general(format!("failed to enter alternate screen: {}", e)))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| CliError::general(format!("failed to create terminal: {}", e)))?;

    loop {
        app.poll_pending();

        let size = terminal
            .size()
            .map_err(|e| CliError::general(format!("terminal size error: {}", e)))?;
        let visible_rows = size.height.saturating_sub(app.chrome_rows()) as usize;
        app.ensure_visible(visible_rows, size.width);

        terminal
            .draw(|frame| draw::draw(app, frame))
            .map_err(|e| CliError::general(format!("draw error: {}", e)))?;

        if event::poll(Duration::from_millis(100))
            .map_err(|e| CliError::general(format!("event poll error: {}", e)))?
        {
            if let Event::Key(key) =
                event::read().map_err(|e| CliError::general(format!("event read error: {}", e)))?
            {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use quill_core::Position;

    fn app() -> EditorApp {
        let editor = Editor::new();
        let client = LlmClient::new("http://127.0.0.1:1", "llama3:8b");
        EditorApp::new(editor, client, 4)
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn typing_flows_into_the_editor() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('h'), KeyModifiers::NONE));
        app.handle_key(press(KeyCode::Char('i'), KeyModifiers::NONE));
        assert_eq!(app.editor.document.buffer.as_string(), "hi");
    }

    #[test]
    fn ask_without_selection_sets_notice_and_opens_nothing() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('k'), KeyModifiers::CONTROL));
        assert!(app.ask.is_none());
        assert!(app.pending.is_none());
        assert_eq!(app.notice.as_deref(), Some("Select some text first"));
    }

    #[test]
    fn empty_question_is_refused_without_spawning_a_query() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('x'), KeyModifiers::NONE));
        app.handle_key(press(KeyCode::Left, KeyModifiers::SHIFT));
        app.handle_key(press(KeyCode::Char('k'), KeyModifiers::CONTROL));
        assert!(app.ask.is_some());

        app.handle_key(press(KeyCode::Enter, KeyModifiers::NONE));
        assert!(app.pending.is_none());
        assert_eq!(app.notice.as_deref(), Some("Type a question first"));
    }

    #[test]
    fn cut_and_paste_through_the_register() {
        let mut app = app();
        for ch in "hello".chars() {
            app.handle_key(press(KeyCode::Char(ch), KeyModifiers::NONE));
        }
        app.handle_key(press(KeyCode::Char('a'), KeyModifiers::CONTROL));
        app.handle_key(press(KeyCode::Char('x'), KeyModifiers::CONTROL));
        assert_eq!(app.register, "hello");
        assert_eq!(app.editor.document.buffer.as_string(), "");

        app.handle_key(press(KeyCode::Char('v'), KeyModifiers::CONTROL));
        app.handle_key(press(KeyCode::Char('v'), KeyModifiers::CONTROL));
        assert_eq!(app.editor.document.buffer.as_string(), "hellohello");
    }

    #[test]
    fn quit_with_unsaved_changes_needs_two_presses() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('x'), KeyModifiers::NONE));
        app.handle_key(press(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(!app.should_quit);
        app.handle_key(press(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn any_edit_between_quit_presses_disarms() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('x'), KeyModifiers::NONE));
        app.handle_key(press(KeyCode::Char('q'), KeyModifiers::CONTROL));
        app.handle_key(press(KeyCode::Char('y'), KeyModifiers::NONE));
        app.handle_key(press(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert!(!app.should_quit);
    }

    #[test]
    fn save_untitled_opens_save_as_prompt() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('x'), KeyModifiers::NONE));
        app.handle_key(press(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert!(matches!(
            app.mode,
            Mode::Prompt {
                kind: PromptKind::SaveAs,
                ..
            }
        ));
    }

    #[test]
    fn open_prompt_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "from disk").unwrap();

        let mut app = app();
        app.handle_key(press(KeyCode::Char('o'), KeyModifiers::CONTROL));
        for ch in path.to_string_lossy().chars() {
            app.handle_key(press(KeyCode::Char(ch), KeyModifiers::NONE));
        }
        app.handle_key(press(KeyCode::Enter, KeyModifiers::NONE));

        assert!(matches!(app.mode, Mode::Edit));
        assert_eq!(app.editor.document.buffer.as_string(), "from disk");
    }

    #[test]
    fn failed_open_keeps_buffer_and_notices() {
        let mut app = app();
        app.handle_key(press(KeyCode::Char('z'), KeyModifiers::NONE));
        app.open_path(Path::new("/no/such/file.txt"));
        assert_eq!(app.editor.document.buffer.as_string(), "z");
        assert!(app.notice.as_deref().unwrap().contains("Failed to open"));
    }

    #[test]
    fn ensure_visible_scrolls_to_cursor() {
        let mut app = app();
        for _ in 0..30 {
            app.handle_key(press(KeyCode::Enter, KeyModifiers::NONE));
        }
        assert_eq!(app.editor.cursor(), Position::new(30, 0));
        app.ensure_visible(10, 80);
        assert_eq!(app.scroll_row, 21);
    }

    #[test]
    fn status_bar_reappears_for_path_prompts() {
        let mut app = app();
        app.show_status_bar = false;
        assert_eq!(app.chrome_rows(), 1);

        app.handle_key(press(KeyCode::Char('o'), KeyModifiers::CONTROL));
        assert!(app.status_visible());
        assert_eq!(app.chrome_rows(), 2);
    }

    #[test]
    fn display_width_counts_wide_chars() {
        assert_eq!(display_width("abc", 0, 3), 3);
        assert_eq!(display_width("日本語", 0, 2), 4);
        assert_eq!(display_width("abc", 1, 3), 2);
    }
}
