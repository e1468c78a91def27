use std::fmt::Write as _;

use tracing::debug;

use crate::diff::{DEFAULT_CONTEXT, apply_edits, classify_edits, to_unified};
use crate::model::{ClassifiedLine, EditOperation, LineOrigin};
use crate::render::ansi::{fit_to_width, spans_to_ansi};
use crate::render::layout::{self, DisplayMode};
use crate::render::pane::PaneBuilder;
use crate::syntax::SyntaxHighlighter;

pub const NO_CHANGES: &str = "No changes to display";
pub const GENERATE_FAILED: &str = "Error generating diff";
pub const APPLY_FAILED: &str = "Error applying edits";
pub const DIVIDER: &str = " │ ";

#[derive(Default)]
pub struct TextOptions<'a> {
    /// Terminal width used to plan the layout.
    pub width: u16,
    pub show_whitespace: bool,
    pub highlighter: Option<&'a SyntaxHighlighter>,
}

/// Render one file's edit script as a static side-by-side string, one
/// `left │ right` line per row with SGR styling.
///
/// Falls back to plain unified text when the width cannot hold two panes.
/// Failures produce a placeholder string instead of an error.
pub fn render_side_by_side_from_edits(
    edits: &[EditOperation],
    original: &str,
    label: &str,
    opts: &TextOptions<'_>,
) -> String {
    if edits.is_empty() {
        return NO_CHANGES.to_string();
    }

    let old_label = format!("a/{}", label);
    let new_label = format!("b/{}", label);

    let decision = layout::plan(opts.width);
    if decision.mode == DisplayMode::Unified {
        return to_unified(&old_label, &new_label, original, edits, DEFAULT_CONTEXT)
            .unwrap_or_else(|err| {
                debug!(%err, label, "unified fallback failed");
                GENERATE_FAILED.to_string()
            });
    }

    if let Err(err) = apply_edits(original, edits) {
        debug!(%err, label, "edit script does not apply");
        return APPLY_FAILED.to_string();
    }

    let mut lines = vec![
        ClassifiedLine::header(LineOrigin::FileHeader, format!("--- {}", old_label)),
        ClassifiedLine::header(LineOrigin::FileHeader, format!("+++ {}", new_label)),
    ];
    match classify_edits(original, edits, Some(DEFAULT_CONTEXT)) {
        Ok(classified) => lines.extend(classified),
        Err(err) => {
            debug!(%err, label, "classification failed");
            return GENERATE_FAILED.to_string();
        }
    }

    let panes = PaneBuilder::new(opts.highlighter, opts.show_whitespace).build(
        &lines,
        decision.left_width,
        decision.right_width,
    );

    let mut out = String::new();
    for (left, right) in panes.left.iter().zip(&panes.right) {
        let left = fit_to_width(&spans_to_ansi(&left.line.spans), decision.left_width);
        let right = fit_to_width(&spans_to_ansi(&right.line.spans), decision.right_width);
        let _ = writeln!(out, "{}{}{}", left, DIVIDER, right);
    }
    out
}
