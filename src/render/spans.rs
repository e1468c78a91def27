//! Width-aware helpers over ratatui spans.
//!
//! Widths are terminal columns (`unicode-width`), never bytes. Styled spans
//! carry no escape bytes, so measuring a span sequence is measuring its text.

use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const TAB_WIDTH: usize = 4;

pub fn span_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| s.content.width()).sum()
}

/// Replace tabs with spaces and drop other control characters, which have
/// no defined column width.
pub fn expand_tabs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' => out.push_str(&" ".repeat(TAB_WIDTH)),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Cut spans down to at most `width` columns. A wide character that would
/// straddle the limit is dropped.
pub fn truncate_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Span<'static>> {
    let mut out = Vec::with_capacity(spans.len());
    let mut used = 0;

    for span in spans {
        let span_w = span.content.width();
        if used + span_w <= width {
            used += span_w;
            out.push(span);
            continue;
        }

        let mut kept = String::new();
        for ch in span.content.chars() {
            let ch_w = ch.width().unwrap_or(0);
            if used + ch_w > width {
                break;
            }
            used += ch_w;
            kept.push(ch);
        }
        if !kept.is_empty() {
            out.push(Span::styled(kept, span.style));
        }
        break;
    }

    out
}

/// Truncate or pad with spaces (styled `pad_style`) to exactly `width`.
pub fn fit_spans(spans: Vec<Span<'static>>, width: usize, pad_style: Style) -> Vec<Span<'static>> {
    let mut out = truncate_spans(spans, width);
    let used = span_width(&out);
    if used < width {
        out.push(Span::styled(" ".repeat(width - used), pad_style));
    }
    out
}

/// The spans covering byte range `start..end` of their concatenated text.
pub fn slice_spans(spans: &[Span<'static>], start: usize, end: usize) -> Vec<Span<'static>> {
    let mut out = Vec::new();
    let mut offset = 0;

    for span in spans {
        let len = span.content.len();
        let span_start = offset;
        let span_end = offset + len;
        offset = span_end;

        if span_end <= start || span_start >= end {
            continue;
        }

        let from = start.saturating_sub(span_start);
        let to = end.min(span_end) - span_start;
        if let Some(piece) = span.content.get(from..to)
            && !piece.is_empty()
        {
            out.push(Span::styled(piece.to_string(), span.style));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn text(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn should_expand_tabs_to_four_spaces() {
        assert_eq!(expand_tabs("\tx\ty"), "    x    y");
        assert_eq!(expand_tabs("a\rb"), "ab");
    }

    #[test]
    fn should_truncate_across_span_boundaries() {
        // given
        let spans = vec![Span::raw("abc"), Span::styled("defg", Style::default().fg(Color::Red))];

        // when
        let cut = truncate_spans(spans, 5);

        // then
        assert_eq!(text(&cut), "abcde");
        assert_eq!(cut[1].style.fg, Some(Color::Red));
    }

    #[test]
    fn should_not_split_wide_characters() {
        let cut = truncate_spans(vec![Span::raw("ab世界")], 5);
        assert_eq!(text(&cut), "ab世");
        assert_eq!(span_width(&cut), 4);
    }

    #[test]
    fn should_fit_to_exact_width() {
        let padded = fit_spans(vec![Span::raw("ab")], 6, Style::default());
        let cut = fit_spans(vec![Span::raw("ab世界")], 5, Style::default());

        assert_eq!(span_width(&padded), 6);
        assert_eq!(text(&padded), "ab    ");
        assert_eq!(span_width(&cut), 5);
    }

    #[test]
    fn should_slice_by_byte_range() {
        // given
        let spans = vec![Span::raw("let "), Span::raw("x = "), Span::raw("1;")];

        // when
        let middle = slice_spans(&spans, 2, 9);

        // then
        assert_eq!(text(&middle), "t x = 1");
        assert_eq!(middle.len(), 3);
    }
}
