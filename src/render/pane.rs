//! Builds the two positionally aligned panes of the side-by-side view, and
//! the single pane of the unified view.

use std::path::{Path, PathBuf};

use crate::model::{ClassifiedLine, LineOrigin};
use crate::render::row::{DisplayRow, RowRenderer, Side};
use crate::render::spans::expand_tabs;
use crate::syntax::{FileHighlighter, SyntaxHighlighter};

/// Left (original) and right (revised) rows. Row `i` of one pane sits beside
/// row `i` of the other.
#[derive(Debug, Clone, Default)]
pub struct PaneState {
    pub left: Vec<DisplayRow>,
    pub right: Vec<DisplayRow>,
}

impl PaneState {
    pub fn len(&self) -> usize {
        self.left.len().max(self.right.len())
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// Append two blocks and pad the shorter so both panes advance together.
    fn push_block(
        &mut self,
        mut left: Vec<DisplayRow>,
        mut right: Vec<DisplayRow>,
        left_width: usize,
        right_width: usize,
    ) {
        let height = left.len().max(right.len());
        left.resize_with(height, || DisplayRow::blank(left_width));
        right.resize_with(height, || DisplayRow::blank(right_width));
        self.left.extend(left);
        self.right.extend(right);
    }

    fn balance(&mut self, left_width: usize, right_width: usize) {
        let height = self.len();
        self.left
            .resize_with(height, || DisplayRow::blank(left_width));
        self.right
            .resize_with(height, || DisplayRow::blank(right_width));
    }
}

/// Highlighting state for the current file. The original and revised sides
/// are parsed as separate streams.
struct FileState<'a> {
    old: Option<FileHighlighter<'a>>,
    new: Option<FileHighlighter<'a>>,
}

impl<'a> FileState<'a> {
    fn none() -> Self {
        Self { old: None, new: None }
    }

    fn open(renderer: &RowRenderer<'a>, path: &Path) -> Self {
        Self {
            old: renderer.file_highlighter(path),
            new: renderer.file_highlighter(path),
        }
    }

    /// Advance the original side past a line rendered from the revised one.
    fn skip_old(&mut self, line: &ClassifiedLine) {
        if let Some(old) = self.old.as_mut() {
            old.highlight(&expand_tabs(&line.content));
        }
    }
}

pub struct PaneBuilder<'a> {
    renderer: RowRenderer<'a>,
    show_whitespace: bool,
}

impl<'a> PaneBuilder<'a> {
    pub fn new(highlighter: Option<&'a SyntaxHighlighter>, show_whitespace: bool) -> Self {
        Self {
            renderer: RowRenderer::new(highlighter),
            show_whitespace,
        }
    }

    /// Whether a change line is left out of the rendering. Its line number is
    /// still consumed, since numbers come from the classified line itself.
    fn suppressed(&self, line: &ClassifiedLine) -> bool {
        !self.show_whitespace
            && matches!(line.origin, LineOrigin::Deletion | LineOrigin::Addition)
            && line.is_whitespace_only()
    }

    pub fn build(
        &self,
        lines: &[ClassifiedLine],
        left_width: usize,
        right_width: usize,
    ) -> PaneState {
        let mut panes = PaneState::default();
        let mut state = FileState::none();
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];
            match line.origin {
                LineOrigin::HunkHeader | LineOrigin::FileHeader => {
                    if line.origin == LineOrigin::FileHeader
                        && let Some(path) = header_path(&line.content)
                    {
                        state = FileState::open(&self.renderer, &path);
                    }
                    let left = self.renderer.render(line, Side::Left, left_width, None);
                    let right = self.renderer.render(line, Side::Right, right_width, None);
                    panes.push_block(left, right, left_width, right_width);
                    i += 1;
                }
                LineOrigin::Context => {
                    let left = self
                        .renderer
                        .render(line, Side::Left, left_width, state.old.as_mut());
                    let right = self
                        .renderer
                        .render(line, Side::Right, right_width, state.new.as_mut());
                    panes.push_block(left, right, left_width, right_width);
                    i += 1;
                }
                LineOrigin::Deletion | LineOrigin::Addition => {
                    let deletions = run_len(&lines[i..], LineOrigin::Deletion);
                    let additions = run_len(&lines[i + deletions..], LineOrigin::Addition);
                    let run_end = i + deletions + additions;

                    let mut left = Vec::new();
                    for l in lines[i..i + deletions].iter().filter(|l| !self.suppressed(l)) {
                        left.extend(self.renderer.render(
                            l,
                            Side::Left,
                            left_width,
                            state.old.as_mut(),
                        ));
                    }
                    let mut right = Vec::new();
                    for l in lines[i + deletions..run_end]
                        .iter()
                        .filter(|l| !self.suppressed(l))
                    {
                        right.extend(self.renderer.render(
                            l,
                            Side::Right,
                            right_width,
                            state.new.as_mut(),
                        ));
                    }

                    panes.push_block(left, right, left_width, right_width);
                    i = run_end;
                }
            }
        }

        panes.balance(left_width, right_width);
        panes
    }

    pub fn build_unified(&self, lines: &[ClassifiedLine], width: usize) -> Vec<DisplayRow> {
        let mut rows = Vec::with_capacity(lines.len());
        let mut state = FileState::none();

        for line in lines {
            if line.origin == LineOrigin::FileHeader
                && let Some(path) = header_path(&line.content)
            {
                state = FileState::open(&self.renderer, &path);
            }
            if self.suppressed(line) {
                continue;
            }
            let highlight = match line.origin {
                LineOrigin::Deletion => state.old.as_mut(),
                LineOrigin::Addition => state.new.as_mut(),
                LineOrigin::Context => {
                    state.skip_old(line);
                    state.new.as_mut()
                }
                _ => None,
            };
            rows.extend(self.renderer.render(line, Side::Unified, width, highlight));
        }

        rows
    }
}

fn run_len(lines: &[ClassifiedLine], origin: LineOrigin) -> usize {
    lines.iter().take_while(|l| l.origin == origin).count()
}

/// File path named by a file header line, used to pick a lexer.
fn header_path(header: &str) -> Option<PathBuf> {
    let raw = if let Some(rest) = header.strip_prefix("diff --git ") {
        rest.rsplit(' ').next()?
    } else {
        header
            .strip_prefix("+++ ")
            .or_else(|| header.strip_prefix("--- "))?
            .split('\t')
            .next()?
    };

    if raw == "/dev/null" {
        return None;
    }
    let stripped = raw
        .strip_prefix("b/")
        .or_else(|| raw.strip_prefix("a/"))
        .unwrap_or(raw);
    Some(PathBuf::from(stripped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{classify_edits, classify_unified, compute_edits};

    fn texts(rows: &[DisplayRow]) -> Vec<String> {
        rows.iter().map(|r| r.plain_text()).collect()
    }

    #[test]
    fn should_align_replaced_line_on_same_row() {
        // given
        let from = "line 1\nline 2\nline 3";
        let to = "line 1\nmodified line 2\nline 3\nline 4";
        let lines = classify_edits(from, &compute_edits(from, to), None).unwrap();

        // when
        let panes = PaneBuilder::new(None, false).build(&lines, 50, 50);

        // then
        assert_eq!(panes.left.len(), panes.right.len());
        let left = texts(&panes.left);
        let right = texts(&panes.right);
        let row = left
            .iter()
            .position(|t| t.contains("│ -line 2"))
            .unwrap();
        assert!(right[row].contains("│ +modified line 2"));
        assert!(left.iter().chain(right.iter()).all(|t| t.chars().count() == 50));
    }

    #[test]
    fn should_pad_shorter_run_with_blank_rows() {
        // given: one deletion replaced by three additions
        let lines = vec![
            ClassifiedLine::header(LineOrigin::HunkHeader, "@@ -1 +1,3 @@"),
            ClassifiedLine::deletion("old", 1),
            ClassifiedLine::addition("new a", 1),
            ClassifiedLine::addition("new b", 2),
            ClassifiedLine::addition("new c", 3),
        ];

        // when
        let panes = PaneBuilder::new(None, false).build(&lines, 40, 40);

        // then
        assert_eq!(panes.len(), 4);
        assert!(panes.left[1].plain_text().starts_with("   1 │ -old"));
        assert_eq!(panes.left[2].plain_text().trim(), "");
        assert_eq!(panes.left[3].plain_text().trim(), "");
        assert!(panes.right[3].plain_text().starts_with("   3 │ +new c"));
    }

    #[test]
    fn should_stay_balanced_when_one_side_wraps_more() {
        // given: a long deletion against a short addition in narrow panes
        let lines = vec![
            ClassifiedLine::deletion(
                "this deleted line is long enough to wrap several times in a narrow pane",
                1,
            ),
            ClassifiedLine::addition("short", 1),
            ClassifiedLine::context("shared context that also wraps on the narrower side only", 2, 2),
        ];

        // when
        let panes = PaneBuilder::new(None, false).build(&lines, 40, 70);

        // then
        assert_eq!(panes.left.len(), panes.right.len());
        assert!(panes.left.iter().all(|r| r.visual_width() == 40));
        assert!(panes.right.iter().all(|r| r.visual_width() == 70));
    }

    #[test]
    fn should_suppress_whitespace_only_changes_but_keep_empty_lines() {
        // given
        let lines = vec![
            ClassifiedLine::deletion("\t", 1),
            ClassifiedLine::deletion("", 2),
            ClassifiedLine::addition("    ", 1),
            ClassifiedLine::addition("", 2),
        ];

        // when
        let hidden = PaneBuilder::new(None, false).build(&lines, 40, 40);
        let shown = PaneBuilder::new(None, true).build(&lines, 40, 40);

        // then
        assert_eq!(hidden.len(), 1);
        assert!(hidden.left[0].plain_text().starts_with("   2 │ -"));
        assert!(hidden.right[0].plain_text().starts_with("   2 │ +"));
        assert_eq!(shown.len(), 2);
    }

    #[test]
    fn should_number_from_hunk_header() {
        // given
        let text = "@@ -10,2 +20,3 @@\n ctx\n-gone\n+came\n+also\n";
        let lines = classify_unified(text);

        // when
        let panes = PaneBuilder::new(None, true).build(&lines, 40, 40);

        // then
        let left = texts(&panes.left);
        let right = texts(&panes.right);
        assert!(left[1].starts_with("  10 │  ctx"));
        assert!(right[1].starts_with("  20 │  ctx"));
        assert!(left[2].starts_with("  11 │ -gone"));
        assert!(right[2].starts_with("  21 │ +came"));
        assert!(right[3].starts_with("  22 │ +also"));
    }

    #[test]
    fn should_treat_leading_additions_as_block_with_empty_left() {
        let lines = vec![
            ClassifiedLine::addition("first", 1),
            ClassifiedLine::addition("second", 2),
        ];

        let panes = PaneBuilder::new(None, false).build(&lines, 40, 40);

        assert_eq!(panes.len(), 2);
        assert!(panes.left.iter().all(|r| r.plain_text().trim().is_empty()));
    }

    #[test]
    fn should_build_unified_rows() {
        // given
        let from = "a\nb\n";
        let to = "a\nc\n";
        let lines = classify_edits(from, &compute_edits(from, to), None).unwrap();

        // when
        let rows = PaneBuilder::new(None, false).build_unified(&lines, 60);

        // then
        let texts = texts(&rows);
        assert_eq!(texts.len(), 3);
        assert!(texts[0].starts_with("   1 │  a"));
        assert!(texts[1].starts_with("   2 │ -b"));
        assert!(texts[2].starts_with("   2 │ +c"));
    }

    #[test]
    fn should_extract_path_from_file_headers() {
        assert_eq!(
            header_path("diff --git a/src/lib.rs b/src/lib.rs"),
            Some(PathBuf::from("src/lib.rs"))
        );
        assert_eq!(
            header_path("+++ b/README.md\t2024-01-01"),
            Some(PathBuf::from("README.md"))
        );
        assert_eq!(header_path("+++ /dev/null"), None);
    }

    #[test]
    fn should_highlight_each_side_as_one_stream() {
        // given: a comment opened in context, then a replaced line inside it
        let lines = vec![
            ClassifiedLine::header(LineOrigin::FileHeader, "--- a/lib.rs"),
            ClassifiedLine::header(LineOrigin::FileHeader, "+++ b/lib.rs"),
            ClassifiedLine::context("/* notes", 1, 1),
            ClassifiedLine::deletion("let old = 1;", 2),
            ClassifiedLine::addition("let new = 2;", 2),
            ClassifiedLine::context("*/", 3, 3),
            ClassifiedLine::context("let after = 3;", 4, 4),
        ];
        let plain = vec![
            ClassifiedLine::header(LineOrigin::FileHeader, "+++ b/lib.rs"),
            ClassifiedLine::addition("let new = 2;", 1),
        ];
        let builder = PaneBuilder::new(Some(&crate::syntax::HIGHLIGHTER), true);

        // when
        let panes = builder.build(&lines, 60, 60);
        let fresh = builder.build(&plain, 60, 60);
        let unified = builder.build_unified(&lines, 60);

        // then: inside the comment every content span shares one style
        let content = |row: &DisplayRow| -> Vec<ratatui::text::Span<'static>> {
            row.line.spans[2..]
                .iter()
                .filter(|s| !s.content.trim().is_empty())
                .cloned()
                .collect()
        };
        let commented = content(&panes.right[3]);
        assert!(commented.iter().all(|s| s.style.fg == commented[0].style.fg));
        let keyword = content(&fresh.right[1]);
        assert_ne!(commented[0].style.fg, keyword[0].style.fg);
        let deleted = content(&panes.left[3]);
        assert!(deleted.iter().all(|s| s.style.fg == deleted[0].style.fg));
        // and after the comment closes, code is highlighted again
        assert!(content(&panes.right[5]).len() > 1);
        assert!(content(&unified[6]).len() > 1);
        for row in [&unified[3], &unified[4]] {
            let spans = content(row);
            assert!(spans.iter().all(|s| s.style.fg == spans[0].style.fg));
        }
    }
}
