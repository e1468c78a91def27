use ratatui::style::{Color, Modifier, Style};

// Base colors
pub const BG_HIGHLIGHT: Color = Color::Rgb(50, 50, 50);
pub const FG_PRIMARY: Color = Color::White;
pub const FG_SECONDARY: Color = Color::Gray;
pub const FG_DIM: Color = Color::DarkGray;

// Diff colors
pub const DIFF_ADD: Color = Color::Green;
pub const DIFF_ADD_BG: Color = Color::Rgb(0, 40, 0);
pub const DIFF_DEL: Color = Color::Red;
pub const DIFF_DEL_BG: Color = Color::Rgb(40, 0, 0);
pub const DIFF_CONTEXT: Color = Color::Gray;
pub const DIFF_HUNK_HEADER: Color = Color::Cyan;
pub const LINE_NUMBER: Color = Color::DarkGray;

// UI element colors
pub const BORDER_FOCUSED: Color = Color::Cyan;
pub const BORDER_UNFOCUSED: Color = Color::DarkGray;
pub const STATUS_BAR_BG: Color = Color::Rgb(40, 40, 40);
pub const ERROR: Color = Color::Red;
pub const SUCCESS: Color = Color::Green;

// Styles
pub fn title_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

pub fn header_style() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(BG_HIGHLIGHT).fg(FG_PRIMARY)
}

pub fn picked_style() -> Style {
    Style::default().fg(SUCCESS).add_modifier(Modifier::BOLD)
}

pub fn dim_style() -> Style {
    Style::default().fg(FG_DIM)
}

pub fn diff_add_style() -> Style {
    Style::default().fg(DIFF_ADD).bg(DIFF_ADD_BG)
}

pub fn diff_del_style() -> Style {
    Style::default().fg(DIFF_DEL).bg(DIFF_DEL_BG)
}

pub fn diff_context_style() -> Style {
    Style::default().fg(DIFF_CONTEXT)
}

pub fn diff_hunk_header_style() -> Style {
    Style::default()
        .fg(DIFF_HUNK_HEADER)
        .add_modifier(Modifier::BOLD)
}

pub fn file_header_style() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn line_number_style() -> Style {
    Style::default().fg(LINE_NUMBER)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(BORDER_FOCUSED)
    } else {
        Style::default().fg(BORDER_UNFOCUSED)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(STATUS_BAR_BG).fg(FG_PRIMARY)
}

pub fn mode_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR).add_modifier(Modifier::BOLD)
}

pub fn success_style() -> Style {
    Style::default().fg(SUCCESS)
}

pub fn help_style() -> Style {
    Style::default().fg(FG_SECONDARY)
}

pub fn file_status_style(status: char) -> Style {
    let color = match status {
        'A' => DIFF_ADD,
        'M' => Color::Yellow,
        'D' => DIFF_DEL,
        _ => FG_SECONDARY,
    };
    Style::default().fg(color)
}
