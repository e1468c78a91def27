use std::ops::Range;
use std::path::Path;

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use textwrap::WordSeparator;
use textwrap::core::break_words;
use textwrap::wrap_algorithms::wrap_first_fit;

use crate::model::{ClassifiedLine, LineOrigin};
use crate::render::spans::{expand_tabs, fit_spans, slice_spans, span_width};
use crate::syntax::{FileHighlighter, SyntaxHighlighter};
use crate::ui::styles;

pub const LINE_NUMBER_WIDTH: usize = 4;
pub const MARKER_WIDTH: usize = 4;
pub const PREFIX_WIDTH: usize = LINE_NUMBER_WIDTH + MARKER_WIDTH;
/// At or below this many content columns, rows are truncated instead of
/// wrapped.
pub const MIN_WRAP_WIDTH: usize = 10;

/// Which column a line is rendered into; picks the line number shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Unified,
}

/// One terminal row, exactly `width` columns wide.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub line: Line<'static>,
    pub width: usize,
}

impl DisplayRow {
    pub fn blank(width: usize) -> Self {
        Self {
            line: Line::from(" ".repeat(width)),
            width,
        }
    }

    fn fitted(spans: Vec<Span<'static>>, width: usize, pad_style: Style) -> Self {
        Self {
            line: Line::from(fit_spans(spans, width, pad_style)),
            width,
        }
    }

    pub fn visual_width(&self) -> usize {
        span_width(&self.line.spans)
    }

    #[cfg(test)]
    pub fn plain_text(&self) -> String {
        self.line.spans.iter().map(|s| s.content.as_ref()).collect()
    }
}

/// Turns a classified line into one or more width-exact rows.
pub struct RowRenderer<'a> {
    highlighter: Option<&'a SyntaxHighlighter>,
}

impl<'a> RowRenderer<'a> {
    /// `highlighter` is `None` when syntax highlighting is off.
    pub fn new(highlighter: Option<&'a SyntaxHighlighter>) -> Self {
        Self { highlighter }
    }

    /// Fresh parse state for `path`, or `None` when highlighting is off or no
    /// lexer matches.
    pub fn file_highlighter(&self, path: &Path) -> Option<FileHighlighter<'a>> {
        self.highlighter?.for_file(path)
    }

    /// Render `line`. Its content is fed to `highlight` when given, which
    /// must be the state for the same file and side as the lines before it.
    pub fn render(
        &self,
        line: &ClassifiedLine,
        side: Side,
        width: usize,
        highlight: Option<&mut FileHighlighter<'_>>,
    ) -> Vec<DisplayRow> {
        if line.origin.is_header() {
            let style = match line.origin {
                LineOrigin::HunkHeader => styles::diff_hunk_header_style(),
                _ => styles::file_header_style(),
            };
            let content = expand_tabs(&line.content);
            return vec![DisplayRow::fitted(
                vec![Span::styled(content, style)],
                width,
                Style::default(),
            )];
        }

        let (prefix_style, content_style, pad_style, marker) = match line.origin {
            LineOrigin::Deletion => (
                styles::diff_del_style(),
                styles::diff_del_style(),
                Style::default().bg(styles::DIFF_DEL_BG),
                " │ -",
            ),
            LineOrigin::Addition => (
                styles::diff_add_style(),
                styles::diff_add_style(),
                Style::default().bg(styles::DIFF_ADD_BG),
                " │ +",
            ),
            _ => (
                styles::line_number_style(),
                styles::diff_context_style(),
                Style::default(),
                " │  ",
            ),
        };

        let lineno = match side {
            Side::Left => line.old_lineno,
            Side::Right => line.new_lineno,
            Side::Unified => line.new_lineno.or(line.old_lineno),
        };
        let number = lineno.map(|n| n.to_string()).unwrap_or_default();
        let prefix = vec![
            Span::styled(format!("{:>4}", number), prefix_style),
            Span::styled(marker, prefix_style),
        ];

        let text = expand_tabs(&line.content);
        let content = content_spans(&text, line.origin, content_style, highlight);
        let content_width = width.saturating_sub(PREFIX_WIDTH);

        if content_width <= MIN_WRAP_WIDTH {
            let mut spans = prefix;
            spans.extend(content);
            return vec![DisplayRow::fitted(spans, width, pad_style)];
        }

        wrap_ranges(&text, content_width)
            .into_iter()
            .enumerate()
            .map(|(i, range)| {
                let mut spans = if i == 0 {
                    prefix.clone()
                } else {
                    vec![Span::raw(" ".repeat(PREFIX_WIDTH))]
                };
                spans.extend(slice_spans(&content, range.start, range.end));
                DisplayRow::fitted(spans, width, pad_style)
            })
            .collect()
    }
}

fn content_spans(
    text: &str,
    origin: LineOrigin,
    fallback: Style,
    highlight: Option<&mut FileHighlighter<'_>>,
) -> Vec<Span<'static>> {
    match highlight.and_then(|h| h.highlight(text)) {
        Some(spans) => SyntaxHighlighter::apply_diff_background(spans, origin),
        None => vec![Span::styled(text.to_string(), fallback)],
    }
}

/// Byte ranges of `text`, one per wrapped row. Breaks at ASCII spaces and
/// splits words longer than `width`. Whitespace at a break is dropped.
pub fn wrap_ranges(text: &str, width: usize) -> Vec<Range<usize>> {
    if text.is_empty() || width == 0 {
        return vec![0..text.len()];
    }

    let words = break_words(WordSeparator::AsciiSpace.find_words(text), width);
    let lines = wrap_first_fit(&words, &[width as f64]);

    let mut ranges = Vec::with_capacity(lines.len());
    let mut offset = 0;
    for line in lines {
        let start = offset;
        let mut end = offset;
        for word in line {
            end = offset + word.word.len();
            offset += word.word.len() + word.whitespace.len();
        }
        ranges.push(start..end);
    }

    if ranges.is_empty() {
        ranges.push(0..0);
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn texts(rows: &[DisplayRow]) -> Vec<String> {
        rows.iter().map(|r| r.plain_text()).collect()
    }

    #[test]
    fn should_compose_prefix_and_pad() {
        // given
        let renderer = RowRenderer::new(None);
        let line = ClassifiedLine::deletion("let x = 1;", 12);

        // when
        let rows = renderer.render(&line, Side::Left, 40, None);

        // then
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].visual_width(), 40);
        assert!(rows[0].plain_text().starts_with("  12 │ -let x = 1;"));
    }

    #[test]
    fn should_pick_line_number_by_side() {
        let renderer = RowRenderer::new(None);
        let line = ClassifiedLine::context("same", 3, 7);

        let left = renderer.render(&line, Side::Left, 40, None);
        let right = renderer.render(&line, Side::Right, 40, None);

        assert!(left[0].plain_text().starts_with("   3 │  same"));
        assert!(right[0].plain_text().starts_with("   7 │  same"));
    }

    #[test]
    fn should_wrap_with_indented_continuations() {
        // given: 20 content columns
        let renderer = RowRenderer::new(None);
        let line = ClassifiedLine::addition("alpha beta gamma delta epsilon zeta", 1);

        // when
        let rows = renderer.render(&line, Side::Right, 28, None);

        // then
        let texts = texts(&rows);
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0], "   1 │ +alpha beta gamma    ");
        assert_eq!(texts[1], "        delta epsilon zeta  ");
        assert!(rows.iter().all(|r| r.visual_width() == 28));
    }

    #[test]
    fn should_truncate_when_content_area_is_narrow() {
        // given: 18 - 8 = 10 content columns, at the floor
        let renderer = RowRenderer::new(None);
        let line = ClassifiedLine::addition("a long line that would otherwise wrap", 5);

        // when
        let rows = renderer.render(&line, Side::Right, 18, None);

        // then
        assert_eq!(texts(&rows), vec!["   5 │ +a long lin".to_string()]);
    }

    #[test]
    fn should_keep_exact_width_for_many_widths() {
        let renderer = RowRenderer::new(None);
        let line = ClassifiedLine::context(
            "fn render(&self, line: &ClassifiedLine)\t-> Vec<DisplayRow> { 世界 }",
            10,
            10,
        );

        for width in 0..120 {
            for row in renderer.render(&line, Side::Unified, width, None) {
                assert_eq!(row.visual_width(), width, "width {}", width);
            }
        }
    }

    #[test]
    fn should_break_words_longer_than_width() {
        let ranges = wrap_ranges("abcdefghijklmnopqrstuvwxy", 10);
        assert_eq!(ranges, vec![0..10, 10..20, 20..25]);
    }

    #[test]
    fn should_keep_leading_indentation_in_first_row() {
        let ranges = wrap_ranges("    return value;", 40);
        assert_eq!(ranges, vec![0..17]);
    }

    #[test]
    fn should_render_empty_line_as_single_row() {
        let renderer = RowRenderer::new(None);
        let rows = renderer.render(&ClassifiedLine::addition("", 4), Side::Right, 40, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].plain_text().trim_end(), "   4 │ +");
    }

    #[test]
    fn should_render_header_as_single_truncated_row() {
        let renderer = RowRenderer::new(None);
        let header = ClassifiedLine::header(LineOrigin::HunkHeader, "@@ -1,3 +1,4 @@ fn some_long_context()");

        let rows = renderer.render(&header, Side::Left, 12, None);

        assert_eq!(texts(&rows), vec!["@@ -1,3 +1,4".to_string()]);
    }

    #[test]
    fn should_highlight_content_when_lexer_matches() {
        // given
        let renderer = RowRenderer::new(Some(&crate::syntax::HIGHLIGHTER));
        let mut state = renderer.file_highlighter(&PathBuf::from("lib.rs"));
        let line = ClassifiedLine::addition("pub fn run() {}", 1);

        // when
        let rows = renderer.render(&line, Side::Right, 60, state.as_mut());

        // then
        assert!(rows[0].plain_text().contains("pub fn run() {}"));
        assert!(rows[0].line.spans.len() > 4);
        assert!(
            rows[0]
                .line
                .spans
                .iter()
                .all(|s| s.style.bg == Some(styles::DIFF_ADD_BG))
        );
    }

    #[test]
    fn should_not_offer_state_when_highlighting_is_off() {
        let renderer = RowRenderer::new(None);
        assert!(renderer.file_highlighter(&PathBuf::from("lib.rs")).is_none());
    }
}
