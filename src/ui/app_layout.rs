use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, MessageKind, RefPicker, RefSide, Screen};
use crate::git::refs::RefKind;
use crate::ui::styles;

const REF_SELECT_HINT: &str =
    "Tab: switch side | Enter/Space: select | r: reset side | R: reset all | q: quit";

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    match (app.screen, &app.refs) {
        (Screen::RefSelect, Some(picker)) => render_ref_select(frame, picker, chunks[0]),
        (Screen::Result, _) => render_result(frame, app, chunks[0]),
        _ => app.viewer.render(frame, chunks[0]),
    }
    render_status_bar(frame, app, chunks[1]);
}

fn render_ref_select(frame: &mut Frame, picker: &RefPicker, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Ref lists
            Constraint::Length(1), // Selection status
        ])
        .split(area);

    let header = Paragraph::new(" Select Git References ")
        .style(styles::title_style())
        .block(Block::default());
    frame.render_widget(header, chunks[0]);

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_ref_list(frame, picker, RefSide::Current, lists[0]);
    render_ref_list(frame, picker, RefSide::Incoming, lists[1]);

    let status_style = if picker.picked(RefSide::Current).is_some()
        && picker.picked(RefSide::Incoming).is_some()
    {
        styles::picked_style()
    } else {
        styles::help_style()
    };
    let footer = Paragraph::new(format!(" {}", picker.status())).style(status_style);
    frame.render_widget(footer, chunks[2]);
}

fn render_ref_list(frame: &mut Frame, picker: &RefPicker, side: RefSide, area: Rect) {
    let focused = picker.side == side;
    let title = match picker.picked(side) {
        Some(entry) => format!(" {} ✓ {} ", side.title(), entry.name),
        None => format!(" {} ", side.title()),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = picker.cursor(side);
    let height = usize::from(inner.height).max(1);
    let offset = (cursor + 1).saturating_sub(height);
    let picked = picker.picked(side);

    let items: Vec<Line> = picker
        .entries
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, entry)| {
            let is_cursor = i == cursor;
            let pointer = if is_cursor && focused { ">" } else { " " };
            let mark = if picked == Some(entry) { "✓" } else { " " };

            let style = if is_cursor {
                styles::selected_style()
            } else {
                Style::default()
            };

            let detail = match entry.kind {
                RefKind::Staged => format!(" ({})", entry.kind.label()),
                _ => format!(" ({} {})", entry.short_id, entry.kind.label()),
            };
            Line::from(vec![
                Span::styled(format!("{} ", pointer), style),
                Span::styled(format!("{} ", mark), styles::picked_style()),
                Span::styled(entry.name.clone(), style),
                Span::styled(detail, styles::dim_style()),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(items), inner);
}

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" Generated with {} ", app.model().short_name()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = app
        .result_lines()
        .into_iter()
        .enumerate()
        .map(|(i, line)| match i {
            0 | 3 => line.style(styles::header_style()),
            1 => line.style(styles::success_style()),
            _ => line,
        })
        .skip(app.result_view.offset())
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode = match app.screen {
        Screen::RefSelect => " REFS ",
        Screen::Diff => " DIFF ",
        Screen::Result => " RESULT ",
    };

    let mut spans = vec![Span::styled(mode, styles::mode_style()), Span::raw(" ")];

    match &app.message {
        Some(message) => {
            let style = match message.kind {
                MessageKind::Info => styles::status_bar_style(),
                MessageKind::Error => styles::error_style(),
            };
            spans.push(Span::styled(message.text.clone(), style));
        }
        None if app.screen == Screen::RefSelect => {
            spans.push(Span::styled(REF_SELECT_HINT, styles::status_bar_style()));
        }
        None => {
            let mut counts: Vec<(char, usize)> = Vec::new();
            for file in app.files.iter().filter(|f| f.has_changes()) {
                let status = file.status.as_char();
                match counts.iter_mut().find(|(c, _)| *c == status) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((status, 1)),
                }
            }
            for (status, n) in &counts {
                spans.push(Span::styled(
                    format!("{}{} ", status, n),
                    styles::file_status_style(*status),
                ));
            }
            let changed: usize = counts.iter().map(|(_, n)| n).sum();
            let hint = match app.screen {
                Screen::Result => "c: copy | p: save PR | d: diff | q: quit",
                _ if app.refs.is_some() => "g: generate | b: back to refs",
                _ => "g: generate",
            };
            spans.push(Span::styled(
                format!("{} file(s) | {}", changed, hint),
                styles::status_bar_style(),
            ));
        }
    }

    let refs = if app.base_label.is_empty() {
        String::new()
    } else {
        format!(" {}..{} ", app.base_label, app.head_label)
    };
    let used: usize = spans.iter().map(|s| s.content.width()).sum();
    let padding = usize::from(area.width).saturating_sub(used + refs.width());
    spans.push(Span::styled(" ".repeat(padding), styles::status_bar_style()));
    spans.push(Span::styled(refs, styles::dim_style()));

    let status = Paragraph::new(Line::from(spans)).style(styles::status_bar_style());
    frame.render_widget(status, area);
}
