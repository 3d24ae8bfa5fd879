// Rendering for the editor TUI.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use quill_core::Position;

use super::{display_width, AskState, EditorApp, Mode};

pub(super) fn draw(app: &EditorApp, frame: &mut Frame) {
    let area = frame.area();
    let status = app.status_visible();
    let mut constraints = vec![Constraint::Length(1), Constraint::Min(1)];
    if status {
        constraints.push(Constraint::Length(1));
    }
    let chunks = Layout::vertical(constraints).split(area);

    draw_title(app, frame, chunks[0]);
    draw_text_area(app, frame, chunks[1]);
    if status {
        draw_status(app, frame, chunks[2]);
    }

    if let (Mode::Ask, Some(ask)) = (&app.mode, &app.ask) {
        draw_ask_popup(app, ask, frame, area);
    }

    if app.show_help {
        draw_help(frame, area);
    }
}

fn draw_title(app: &EditorApp, frame: &mut Frame, area: Rect) {
    let dirty = if app.editor.document.is_dirty() {
        " *"
    } else {
        ""
    };
    let title = format!(" quill: {}{} ", app.editor.document.display_name(), dirty);
    let para = Paragraph::new(Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .style(Style::default().bg(Color::Cyan));
    frame.render_widget(para, area);
}

fn draw_text_area(app: &EditorApp, frame: &mut Frame, area: Rect) {
    let buffer = &app.editor.document.buffer;
    let selection = app.editor.selection();
    let height = area.height as usize;
    let end_row = (app.scroll_row + height).min(buffer.line_count());

    let mut lines: Vec<Line> = Vec::with_capacity(height);
    for row in app.scroll_row..end_row {
        let line = buffer.line(row).unwrap_or("");
        let sel_cols = selection
            .and_then(|sel| selection_span_in_row(sel, row, buffer.line_len(row)));
        lines.push(render_line(
            line,
            app.scroll_col,
            area.width as usize,
            sel_cols,
        ));
    }
    frame.render_widget(Paragraph::new(lines), area);

    // Hardware cursor only while actually editing
    if matches!(app.mode, Mode::Edit) && !app.show_help {
        let cursor = app.editor.cursor();
        if cursor.row >= app.scroll_row && cursor.row < app.scroll_row + height {
            let line = buffer.line(cursor.row).unwrap_or("");
            let x = display_width(line, app.scroll_col, cursor.col) as u16;
            let y = area.y + (cursor.row - app.scroll_row) as u16;
            frame.set_cursor_position((area.x + x.min(area.width.saturating_sub(1)), y));
        }
    }
}

/// Render one buffer line, starting at `scroll_col`, highlighting the
/// selected char range.
fn render_line(
    line: &str,
    scroll_col: usize,
    max_width: usize,
    sel_cols: Option<(usize, usize)>,
) -> Line<'static> {
    let sel_style = Style::default().add_modifier(Modifier::REVERSED);
    let mut spans: Vec<Span> = Vec::new();
    let mut run = String::new();
    let mut run_selected = false;
    let mut used = 0usize;

    for (col, ch) in line.chars().enumerate().skip(scroll_col) {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        used += w;
        let selected = sel_cols.is_some_and(|(a, b)| col >= a && col < b);
        if selected != run_selected && !run.is_empty() {
            let style = if run_selected { sel_style } else { Style::default() };
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        run_selected = selected;
        run.push(ch);
    }
    if !run.is_empty() {
        let style = if run_selected { sel_style } else { Style::default() };
        spans.push(Span::styled(run, style));
    }
    Line::from(spans)
}

/// Selected char range of `row`, if the ordered selection touches it.
/// Rows strictly inside the selection are selected to end of line.
fn selection_span_in_row(
    sel: (Position, Position),
    row: usize,
    line_len: usize,
) -> Option<(usize, usize)> {
    let (start, end) = sel;
    if row < start.row || row > end.row {
        return None;
    }
    let a = if row == start.row { start.col } else { 0 };
    let b = if row == end.row { end.col } else { line_len };
    if a >= b {
        return None;
    }
    Some((a, b.min(line_len)))
}

fn draw_status(app: &EditorApp, frame: &mut Frame, area: Rect) {
    let style = Style::default().fg(Color::Black).bg(Color::Gray);

    if let Mode::Prompt { kind, input } = &app.mode {
        let text = format!(" {}: {}", kind.label(), input);
        let para = Paragraph::new(Line::from(Span::styled(text.clone(), style))).style(style);
        frame.render_widget(para, area);
        let x = display_width(&text, 0, text.chars().count()) as u16;
        frame.set_cursor_position((area.x + x.min(area.width.saturating_sub(1)), area.y));
        return;
    }

    let cursor = app.editor.cursor();
    let left = match &app.notice {
        Some(notice) => format!(" {}", notice),
        None => " Ctrl-S save  Ctrl-K ask AI  F1 help".to_string(),
    };
    let right = format!("Ln {}, Col {} ", cursor.row + 1, cursor.col + 1);

    let width = area.width as usize;
    let pad = width
        .saturating_sub(left.chars().count())
        .saturating_sub(right.chars().count());
    let text = format!("{}{}{}", left, " ".repeat(pad), right);
    let para = Paragraph::new(Line::from(Span::styled(text, style))).style(style);
    frame.render_widget(para, area);
}

fn draw_ask_popup(app: &EditorApp, ask: &AskState, frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(4).min(76).max(20);
    let height = area.height.saturating_sub(2).min(22).max(10);
    let popup = centered_rect(area, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Ask AI ")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(popup);

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    let chunks = Layout::vertical([
        Constraint::Length(1), // selected label
        Constraint::Length(4), // selected preview
        Constraint::Length(1), // question label
        Constraint::Length(1), // question input
        Constraint::Length(1), // answer label
        Constraint::Min(1),    // answer
        Constraint::Length(1), // footer
    ])
    .split(inner);

    let label = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(Color::DarkGray);

    frame.render_widget(Paragraph::new(Span::styled("SELECTED TEXT", label)), chunks[0]);
    frame.render_widget(
        Paragraph::new(ask.selected_text.as_str())
            .style(muted)
            .wrap(Wrap { trim: false }),
        chunks[1],
    );

    frame.render_widget(Paragraph::new(Span::styled("QUESTION", label)), chunks[2]);
    let (question_tail, tail_width) =
        tail_fitting(&ask.question, chunks[3].width.saturating_sub(1) as usize);
    frame.render_widget(Paragraph::new(question_tail), chunks[3]);

    frame.render_widget(Paragraph::new(Span::styled("ANSWER", label)), chunks[4]);
    let waiting = app.pending.is_some();
    let answer: Paragraph = if waiting {
        Paragraph::new(Span::styled(
            "Waiting for the model…",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))
    } else {
        match &ask.answer {
            Some(text) => Paragraph::new(text.as_str())
                .wrap(Wrap { trim: false })
                .scroll((ask.scroll, 0)),
            None => Paragraph::new(Span::styled("(press Enter to ask)", muted)),
        }
    };
    frame.render_widget(answer, chunks[5]);

    let footer = if waiting {
        "Waiting… (no cancel)"
    } else {
        "Enter: ask   Esc: close   Up/Down: scroll answer"
    };
    frame.render_widget(Paragraph::new(Span::styled(footer, muted)), chunks[6]);

    if !waiting {
        frame.set_cursor_position((chunks[3].x + tail_width as u16, chunks[3].y));
    }
}

/// Last chars of `text` fitting in `max_width` display columns.
fn tail_fitting(text: &str, max_width: usize) -> (String, usize) {
    let mut chars: Vec<char> = Vec::new();
    let mut width = 0usize;
    for ch in text.chars().rev() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        chars.push(ch);
    }
    chars.reverse();
    (chars.into_iter().collect(), width)
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help_lines = [
        "  Ctrl-N   New file",
        "  Ctrl-O   Open…",
        "  Ctrl-S   Save",
        "  Ctrl-W   Save as…",
        "  Ctrl-Z   Undo",
        "  Ctrl-Y   Redo",
        "  Ctrl-X   Cut selection",
        "  Ctrl-C   Copy selection",
        "  Ctrl-V   Paste",
        "  Ctrl-A   Select all",
        "  Ctrl-K   Ask AI about selection",
        "  Ctrl-Q   Quit",
        "",
        "  Shift+arrows extend the selection.",
        "  Any key closes this help.",
    ];

    let width = (help_lines.iter().map(|s| s.len()).max().unwrap_or(0) + 4) as u16;
    let height = (help_lines.len() + 2) as u16;
    let popup = centered_rect(area, width.min(area.width), height.min(area.height));

    let lines: Vec<Line> = help_lines
        .iter()
        .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Keybindings ")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(
        area.x + x,
        area.y + y,
        width.min(area.width),
        height.min(area.height),
    )
}
