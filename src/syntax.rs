//! Syntax highlighting lookup backed by syntect.
//!
//! A lookup miss (unknown file type, highlighting failure) is the normal
//! path and yields `None`; callers fall back to unstyled text.

use std::path::Path;
use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SyntectStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::model::LineOrigin;
use crate::ui::styles;

const THEME: &str = "base16-ocean.dark";
const PLAIN_TEXT: &str = "Plain Text";

/// Loading syntax definitions is slow, so one instance is shared.
pub static HIGHLIGHTER: LazyLock<SyntaxHighlighter> = LazyLock::new(SyntaxHighlighter::new);

pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(THEME)
            .or_else(|| themes.themes.into_values().next())
            .unwrap_or_default();
        Self { syntax_set, theme }
    }

    /// Find a lexer by exact file name (`Makefile`), then by extension.
    pub fn find_syntax(&self, path: &Path) -> Option<&SyntaxReference> {
        let by_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| self.syntax_set.find_syntax_by_extension(name));
        let by_ext = || {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(|ext| self.syntax_set.find_syntax_by_extension(ext))
        };
        by_name
            .or_else(by_ext)
            .filter(|syntax| syntax.name != PLAIN_TEXT)
    }

    /// A highlighter for one file's lines, fed in order so constructs that
    /// span lines (block comments, strings) keep their state. `None` when no
    /// lexer matches.
    pub fn for_file(&self, path: &Path) -> Option<FileHighlighter<'_>> {
        let syntax = self.find_syntax(path)?;
        Some(FileHighlighter {
            lines: HighlightLines::new(syntax, &self.theme),
            syntax_set: &self.syntax_set,
        })
    }

    /// Lay the diff background for `origin` under highlighted spans.
    pub fn apply_diff_background(
        spans: Vec<Span<'static>>,
        origin: LineOrigin,
    ) -> Vec<Span<'static>> {
        let bg = match origin {
            LineOrigin::Deletion => Some(styles::DIFF_DEL_BG),
            LineOrigin::Addition => Some(styles::DIFF_ADD_BG),
            _ => None,
        };
        match bg {
            Some(bg) => spans
                .into_iter()
                .map(|span| {
                    let style = span.style.bg(bg);
                    span.style(style)
                })
                .collect(),
            None => spans,
        }
    }
}

/// Parse state for one side of one file.
pub struct FileHighlighter<'a> {
    lines: HighlightLines<'a>,
    syntax_set: &'a SyntaxSet,
}

impl FileHighlighter<'_> {
    /// Highlight the next line. `None` if highlighting fails.
    pub fn highlight(&mut self, text: &str) -> Option<Vec<Span<'static>>> {
        let line = format!("{}\n", text);
        let ranges = self.lines.highlight_line(&line, self.syntax_set).ok()?;

        let spans = ranges
            .into_iter()
            .filter_map(|(style, piece)| {
                let piece = piece.trim_end_matches(['\n', '\r']);
                (!piece.is_empty()).then(|| Span::styled(piece.to_string(), convert_style(style)))
            })
            .collect();
        Some(spans)
    }
}

fn convert_style(style: SyntectStyle) -> Style {
    let fg = style.foreground;
    let mut converted = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        converted = converted.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        converted = converted.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        converted = converted.add_modifier(Modifier::UNDERLINED);
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn should_highlight_known_extension() {
        let mut file = HIGHLIGHTER.for_file(&PathBuf::from("src/main.rs")).unwrap();
        let spans = file.highlight("fn main() {}").unwrap();
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "fn main() {}");
        assert!(spans.len() > 1);
    }

    #[test]
    fn should_miss_unknown_extension() {
        assert!(HIGHLIGHTER.for_file(&PathBuf::from("notes.zzqq")).is_none());
    }

    #[test]
    fn should_carry_block_comment_across_lines() {
        // given
        let path = PathBuf::from("lib.rs");
        let mut file = HIGHLIGHTER.for_file(&path).unwrap();
        let mut fresh = HIGHLIGHTER.for_file(&path).unwrap();

        // when
        file.highlight("/* start of a comment");
        let inside = file.highlight("let x = 1;").unwrap();
        let outside = fresh.highlight("let x = 1;").unwrap();

        // then: the whole line takes the comment style
        assert!(inside.iter().all(|s| s.style == inside[0].style));
        assert!(outside.len() > 1);
        assert_eq!(outside[0].content, "let");
        assert_ne!(inside[0].style, outside[0].style);
    }

    #[test]
    fn should_miss_path_without_extension() {
        assert!(
            HIGHLIGHTER
                .find_syntax(&PathBuf::from("LICENSE-unknown"))
                .is_none()
        );
    }

    #[test]
    fn should_apply_background_to_changed_lines_only() {
        let spans = vec![Span::raw("x")];

        let deleted = SyntaxHighlighter::apply_diff_background(spans.clone(), LineOrigin::Deletion);
        let context = SyntaxHighlighter::apply_diff_background(spans, LineOrigin::Context);

        assert_eq!(deleted[0].style.bg, Some(styles::DIFF_DEL_BG));
        assert_eq!(context[0].style.bg, None);
    }
}
