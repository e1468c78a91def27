//! The interactive diff viewer: owns the classified content, the display
//! flags and the scroll state, and turns events into frames.

mod viewport;

pub use viewport::{ScrollMotion, Viewport};

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::{debug, info};

use crate::diff::{DEFAULT_CONTEXT, classify_edits, classify_unified};
use crate::logging::LogHandle;
use crate::model::{ClassifiedLine, FileDiff, FileStatus, LineOrigin};
use crate::render::layout::{self, DisplayMode, LayoutDecision, MIN_SIDE_BY_SIDE_WIDTH};
use crate::render::text::{APPLY_FAILED, DIVIDER};
use crate::render::{DisplayRow, PaneBuilder, PaneState};
use crate::syntax::HIGHLIGHTER;
use crate::ui::styles;

pub const TITLE: &str = "Git Diff Viewer";
pub const NO_CHANGES: &str = "No changes";
pub const HELP: &str = "j/k: scroll | s: toggle side-by-side | h: toggle syntax highlighting | w: toggle whitespace | y: toggle scroll sync | q: quit";

/// Rows taken by the title, spacers and help line.
const CHROME_HEIGHT: u16 = 4;

/// Which pane a scroll applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneTarget {
    Focused,
    Left,
    Right,
    /// Delivered to both panes in one step.
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    Quit,
    ToggleMode,
    ToggleHighlight,
    ToggleWhitespace,
    ToggleScrollSync,
    ToggleFocus,
    Scroll(PaneTarget, ScrollMotion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    Resize { width: u16, height: u16 },
    Key(ViewerKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerOutcome {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerOptions {
    pub mode: DisplayMode,
    pub syntax_highlight: bool,
    pub show_whitespace: bool,
    pub scroll_sync: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            mode: DisplayMode::SideBySide,
            syntax_highlight: true,
            show_whitespace: false,
            scroll_sync: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Left,
    Right,
}

pub struct Viewer {
    lines: Vec<ClassifiedLine>,
    error: Option<String>,
    options: ViewerOptions,

    width: u16,
    height: u16,
    layout: LayoutDecision,

    panes: PaneState,
    unified_rows: Vec<DisplayRow>,
    left: Viewport,
    right: Viewport,
    unified: Viewport,
    focus: Focus,

    log: LogHandle,
}

impl Viewer {
    fn with_lines(lines: Vec<ClassifiedLine>, options: ViewerOptions, log: LogHandle) -> Self {
        let viewer = Self {
            lines,
            error: None,
            options,
            width: 0,
            height: 0,
            layout: layout::effective(options.mode, 0),
            panes: PaneState::default(),
            unified_rows: Vec::new(),
            left: Viewport::default(),
            right: Viewport::default(),
            unified: Viewport::default(),
            focus: Focus::Left,
            log,
        };
        viewer.log.in_scope(|| {
            info!(
                lines = viewer.lines.len(),
                mode = options.mode.label(),
                "viewer opened"
            );
        });
        viewer
    }

    /// View a set of file diffs, each classified into hunks from its edit
    /// script.
    pub fn from_file_diffs(files: &[FileDiff], options: ViewerOptions, log: LogHandle) -> Self {
        match classify_files(files) {
            Ok(lines) => Self::with_lines(lines, options, log),
            Err(err) => Self::with_error(format!("{}: {}", APPLY_FAILED, err), options, log),
        }
    }

    /// View unified-diff text.
    pub fn from_unified(text: &str, options: ViewerOptions, log: LogHandle) -> Self {
        Self::with_lines(classify_unified(text), options, log)
    }

    /// A viewer that only shows `message` and waits for quit.
    pub fn with_error(message: impl Into<String>, options: ViewerOptions, log: LogHandle) -> Self {
        let mut viewer = Self::with_lines(Vec::new(), options, log);
        viewer.error = Some(message.into());
        viewer
    }

    /// Replace the content with `files`, keeping the display flags and the
    /// terminal size. Scroll positions return to the top.
    pub fn reload(&mut self, files: &[FileDiff]) {
        let dispatch = self.log.dispatch().clone();
        tracing::dispatcher::with_default(&dispatch, || {
            match classify_files(files) {
                Ok(lines) => {
                    self.lines = lines;
                    self.error = None;
                }
                Err(err) => {
                    self.lines.clear();
                    self.error = Some(format!("{}: {}", APPLY_FAILED, err));
                }
            }
            for viewport in [&mut self.left, &mut self.right, &mut self.unified] {
                viewport.set_offset(0);
            }
            self.rerender();
            info!(lines = self.lines.len(), files = files.len(), "viewer reloaded");
        });
    }

    pub fn options(&self) -> ViewerOptions {
        self.options
    }

    pub fn layout(&self) -> LayoutDecision {
        self.layout
    }

    pub fn panes(&self) -> &PaneState {
        &self.panes
    }

    pub fn left(&self) -> Viewport {
        self.left
    }

    pub fn right(&self) -> Viewport {
        self.right
    }

    pub fn has_changes(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn handle(&mut self, event: ViewerEvent) -> ViewerOutcome {
        let dispatch = self.log.dispatch().clone();
        tracing::dispatcher::with_default(&dispatch, || self.handle_event(event))
    }

    fn handle_event(&mut self, event: ViewerEvent) -> ViewerOutcome {
        if self.error.is_some() {
            return match event {
                ViewerEvent::Key(ViewerKey::Quit) => ViewerOutcome::Quit,
                ViewerEvent::Resize { width, height } => {
                    self.width = width;
                    self.height = height;
                    ViewerOutcome::Continue
                }
                ViewerEvent::Key(_) => ViewerOutcome::Continue,
            };
        }

        match event {
            ViewerEvent::Resize { width, height } => {
                self.width = width;
                self.height = height;
                self.rerender();
            }
            ViewerEvent::Key(key) => match key {
                ViewerKey::Quit => return ViewerOutcome::Quit,
                ViewerKey::ToggleMode => {
                    self.options.mode = self.options.mode.toggle();
                    self.rerender();
                }
                ViewerKey::ToggleHighlight => {
                    self.options.syntax_highlight = !self.options.syntax_highlight;
                    self.rerender();
                }
                ViewerKey::ToggleWhitespace => {
                    self.options.show_whitespace = !self.options.show_whitespace;
                    self.rerender();
                }
                ViewerKey::ToggleScrollSync => {
                    if self.options.mode == DisplayMode::SideBySide {
                        self.options.scroll_sync = !self.options.scroll_sync;
                        debug!(scroll_sync = self.options.scroll_sync, "toggled scroll sync");
                    }
                }
                ViewerKey::ToggleFocus => {
                    self.focus = match self.focus {
                        Focus::Left => Focus::Right,
                        Focus::Right => Focus::Left,
                    };
                }
                ViewerKey::Scroll(target, motion) => self.scroll(target, motion),
            },
        }

        ViewerOutcome::Continue
    }

    fn pane_height(&self) -> usize {
        let mut chrome = CHROME_HEIGHT;
        if usize::from(self.width) < MIN_SIDE_BY_SIDE_WIDTH {
            chrome += 1;
        }
        usize::from(self.height.saturating_sub(chrome))
    }

    /// Re-run layout planning and pane building for the current width and
    /// flags.
    fn rerender(&mut self) {
        self.layout = layout::effective(self.options.mode, self.width);
        let highlighter = self.options.syntax_highlight.then(|| &*HIGHLIGHTER);
        let builder = PaneBuilder::new(highlighter, self.options.show_whitespace);
        let height = self.pane_height();

        match self.layout.mode {
            DisplayMode::SideBySide => {
                self.panes =
                    builder.build(&self.lines, self.layout.left_width, self.layout.right_width);
                self.unified_rows.clear();
                self.left.resize(height, self.panes.left.len());
                self.right.resize(height, self.panes.right.len());
            }
            DisplayMode::Unified => {
                self.unified_rows = builder.build_unified(&self.lines, self.layout.left_width);
                self.panes = PaneState::default();
                self.unified.resize(height, self.unified_rows.len());
            }
        }

        debug!(
            width = self.width,
            height = self.height,
            mode = self.layout.mode.label(),
            rows = self.panes.len().max(self.unified_rows.len()),
            "rendered diff"
        );
    }

    fn scroll(&mut self, target: PaneTarget, motion: ScrollMotion) {
        if self.layout.mode == DisplayMode::Unified {
            self.unified.apply(motion);
            return;
        }

        let before = (self.left.offset(), self.right.offset());
        let target = match (target, self.focus) {
            (PaneTarget::Focused, Focus::Left) => PaneTarget::Left,
            (PaneTarget::Focused, Focus::Right) => PaneTarget::Right,
            (other, _) => other,
        };
        match target {
            PaneTarget::Left => self.left.apply(motion),
            PaneTarget::Right => self.right.apply(motion),
            PaneTarget::Both | PaneTarget::Focused => {
                self.left.apply(motion);
                self.right.apply(motion);
            }
        }
        self.sync_scroll(before);
    }

    /// Copy a changed offset onto the other pane. When both changed, the
    /// left pane's offset wins.
    fn sync_scroll(&mut self, before: (usize, usize)) {
        if !self.options.scroll_sync {
            return;
        }
        let left_changed = self.left.offset() != before.0;
        let right_changed = self.right.offset() != before.1;
        if left_changed {
            self.right.set_offset(self.left.offset());
        } else if right_changed {
            self.left.set_offset(self.right.offset());
        }
    }

    fn mode_info(&self) -> String {
        let requested = self.options.mode;
        let actual = match (requested, self.layout.mode) {
            (DisplayMode::SideBySide, DisplayMode::Unified) => "unified (auto)",
            (_, mode) => mode.label(),
        };
        let mut info = format!("Mode: {}", actual);
        if requested == DisplayMode::SideBySide && self.layout.mode == DisplayMode::Unified {
            info.push_str(&format!(" (requested: {})", requested.label()));
        }
        info
    }

    /// Every line of the current frame, top to bottom.
    pub fn frame_lines(&self) -> Vec<Line<'static>> {
        if let Some(err) = &self.error {
            return vec![
                Line::from(Span::styled(err.clone(), styles::error_style())),
                Line::from(""),
                Line::from("Press q to quit."),
            ];
        }

        let sync_info = if self.options.mode == DisplayMode::SideBySide {
            format!(" | Scroll sync: {}", self.options.scroll_sync)
        } else {
            String::new()
        };
        let subtitle = format!(
            "{} | Syntax highlighting: {} | Whitespace: {}{} | Width: {}",
            self.mode_info(),
            self.options.syntax_highlight,
            self.options.show_whitespace,
            sync_info,
            self.width
        );

        let mut out = vec![
            Line::from(vec![
                Span::styled(TITLE, styles::title_style()),
                Span::raw(" "),
                Span::styled(subtitle, styles::dim_style()),
            ]),
            Line::from(""),
        ];

        if self.lines.is_empty() {
            out.push(Line::from(NO_CHANGES));
        } else {
            match self.layout.mode {
                DisplayMode::SideBySide => out.extend(self.side_by_side_lines()),
                DisplayMode::Unified => out.extend(
                    self.unified_rows[self.unified.visible()]
                        .iter()
                        .map(|row| row.line.clone()),
                ),
            }
        }

        out.push(Line::from(""));
        out.push(Line::from(Span::styled(HELP, styles::help_style())));
        if usize::from(self.width) < MIN_SIDE_BY_SIDE_WIDTH {
            out.push(Line::from(Span::styled(
                format!(
                    "Terminal width: {} (side-by-side requires ≥{})",
                    self.width, MIN_SIDE_BY_SIDE_WIDTH
                ),
                styles::help_style(),
            )));
        }
        out
    }

    fn side_by_side_lines(&self) -> Vec<Line<'static>> {
        let rows = self
            .left
            .visible()
            .len()
            .max(self.right.visible().len());

        (0..rows)
            .map(|i| {
                let left = self
                    .panes
                    .left
                    .get(self.left.offset() + i)
                    .cloned()
                    .unwrap_or_else(|| DisplayRow::blank(self.layout.left_width));
                let right = self
                    .panes
                    .right
                    .get(self.right.offset() + i)
                    .cloned()
                    .unwrap_or_else(|| DisplayRow::blank(self.layout.right_width));

                let mut spans = left.line.spans;
                spans.push(Span::styled(DIVIDER, styles::dim_style()));
                spans.extend(right.line.spans);
                Line::from(spans)
            })
            .collect()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Paragraph::new(self.frame_lines()), area);
    }
}

/// Classified lines for every changed file, each preceded by its file
/// headers.
fn classify_files(files: &[FileDiff]) -> crate::error::Result<Vec<ClassifiedLine>> {
    let mut lines = Vec::new();
    for file in files.iter().filter(|f| f.has_changes()) {
        let path = file.display_path().display();
        let old = match file.status {
            FileStatus::Added => "/dev/null".to_string(),
            _ => format!("a/{}", path),
        };
        let new = match file.status {
            FileStatus::Deleted => "/dev/null".to_string(),
            _ => format!("b/{}", path),
        };

        lines.push(ClassifiedLine::header(
            LineOrigin::FileHeader,
            format!("diff --git a/{} b/{}", path, path),
        ));
        lines.push(ClassifiedLine::header(LineOrigin::FileHeader, format!("--- {}", old)));
        lines.push(ClassifiedLine::header(LineOrigin::FileHeader, format!("+++ {}", new)));
        lines.extend(classify_edits(
            &file.original,
            &file.edits,
            Some(DEFAULT_CONTEXT),
        )?);
    }
    Ok(lines)
}
