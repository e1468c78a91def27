//! ANSI escape handling for the plain string output.
//!
//! The terminal viewer draws styled spans through ratatui; the static
//! renderer flattens the same spans into SGR-escaped strings. Widths here
//! ignore CSI and OSC sequences.

use std::fmt::Write as _;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const RESET: &str = "\x1b[0m";

/// Printable column width of `text`, skipping escape sequences.
pub fn visual_width(text: &str) -> usize {
    let mut width = 0;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ESC {
            skip_escape(&mut chars);
            continue;
        }
        width += ch.width().unwrap_or(0);
    }
    width
}

/// Truncate or pad `text` to exactly `width` printable columns. Escape
/// sequences are kept; a reset is appended after a cut so styling does not
/// leak into the padding.
pub fn fit_to_width(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len() + width);
    let mut used = 0;
    let mut truncated = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ESC {
            out.push(ch);
            out.push_str(&skip_escape(&mut chars));
            continue;
        }
        let ch_w = ch.width().unwrap_or(0);
        if used + ch_w > width {
            truncated = true;
            break;
        }
        used += ch_w;
        out.push(ch);
    }

    if truncated {
        out.push_str(RESET);
    }
    if used < width {
        out.push_str(&" ".repeat(width - used));
    }
    out
}

/// Consume one escape sequence after its ESC, returning the consumed text.
fn skip_escape<I>(chars: &mut std::iter::Peekable<I>) -> String
where
    I: Iterator<Item = char>,
{
    let mut seq = String::new();
    match chars.peek() {
        // CSI: parameters then a final byte in @..~
        Some('[') => {
            for ch in chars.by_ref() {
                seq.push(ch);
                if seq.len() > 1 && ('@'..='~').contains(&ch) {
                    break;
                }
            }
        }
        // OSC: terminated by BEL or ESC \
        Some(']') => {
            while let Some(ch) = chars.next() {
                seq.push(ch);
                if ch == BEL {
                    break;
                }
                if ch == ESC {
                    if let Some(next) = chars.next() {
                        seq.push(next);
                    }
                    break;
                }
            }
        }
        Some(_) => {
            if let Some(ch) = chars.next() {
                seq.push(ch);
            }
        }
        None => {}
    }
    seq
}

/// Flatten styled spans into a string with SGR escapes.
pub fn spans_to_ansi(spans: &[Span<'_>]) -> String {
    let mut out = String::new();
    for span in spans {
        let sgr = sgr_codes(span.style);
        if sgr.is_empty() {
            out.push_str(&span.content);
        } else {
            let _ = write!(out, "\x1b[{}m{}{}", sgr, span.content, RESET);
        }
    }
    out
}

fn sgr_codes(style: Style) -> String {
    let mut codes: Vec<String> = Vec::new();
    if style.add_modifier.contains(Modifier::BOLD) {
        codes.push("1".into());
    }
    if style.add_modifier.contains(Modifier::DIM) {
        codes.push("2".into());
    }
    if style.add_modifier.contains(Modifier::ITALIC) {
        codes.push("3".into());
    }
    if style.add_modifier.contains(Modifier::UNDERLINED) {
        codes.push("4".into());
    }
    if let Some(fg) = style.fg.and_then(|c| color_code(c, false)) {
        codes.push(fg);
    }
    if let Some(bg) = style.bg.and_then(|c| color_code(c, true)) {
        codes.push(bg);
    }
    codes.join(";")
}

fn color_code(color: Color, background: bool) -> Option<String> {
    let base = if background { 40 } else { 30 };
    let code = match color {
        Color::Reset => return None,
        Color::Black => base,
        Color::Red => base + 1,
        Color::Green => base + 2,
        Color::Yellow => base + 3,
        Color::Blue => base + 4,
        Color::Magenta => base + 5,
        Color::Cyan => base + 6,
        Color::Gray => base + 7,
        Color::DarkGray => base + 60,
        Color::LightRed => base + 61,
        Color::LightGreen => base + 62,
        Color::LightYellow => base + 63,
        Color::LightBlue => base + 64,
        Color::LightMagenta => base + 65,
        Color::LightCyan => base + 66,
        Color::White => base + 67,
        Color::Indexed(i) => return Some(format!("{};5;{}", base + 8, i)),
        Color::Rgb(r, g, b) => return Some(format!("{};2;{};{};{}", base + 8, r, g, b)),
    };
    Some(code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_ignore_escapes_when_measuring() {
        assert_eq!(visual_width("\x1b[1;31mred\x1b[0m"), 3);
        assert_eq!(visual_width("\x1b]8;;http://x\x07link\x1b]8;;\x07"), 4);
        assert_eq!(visual_width("世界"), 4);
    }

    #[test]
    fn should_pad_styled_text_to_width() {
        let fitted = fit_to_width("\x1b[32mok\x1b[0m", 5);
        assert_eq!(visual_width(&fitted), 5);
        assert!(fitted.starts_with("\x1b[32mok"));
    }

    #[test]
    fn should_truncate_and_reset() {
        let fitted = fit_to_width("\x1b[31mabcdef", 3);
        assert_eq!(visual_width(&fitted), 3);
        assert!(fitted.ends_with(RESET));
    }

    #[test]
    fn should_emit_sgr_for_styled_spans() {
        // given
        let spans = vec![
            Span::raw("plain "),
            Span::styled("x", Style::default().fg(Color::Red).bg(Color::Rgb(40, 0, 0))),
        ];

        // when
        let ansi = spans_to_ansi(&spans);

        // then
        assert_eq!(ansi, "plain \x1b[31;48;2;40;0;0mx\x1b[0m");
        assert_eq!(visual_width(&ansi), 7);
    }
}
