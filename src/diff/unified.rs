use std::fmt::Write as _;

use crate::diff::classify::classify_edits;
use crate::error::Result;
use crate::model::{FileDiff, LineOrigin};

pub const DEFAULT_CONTEXT: usize = 3;

/// Render an edit script as unified-diff text with `---`/`+++` labels.
///
/// An empty script renders as an empty string.
pub fn to_unified(
    old_label: &str,
    new_label: &str,
    original: &str,
    edits: &[crate::model::EditOperation],
    context: usize,
) -> Result<String> {
    if edits.is_empty() {
        return Ok(String::new());
    }

    let lines = classify_edits(original, edits, Some(context))?;

    let mut out = String::new();
    let _ = writeln!(out, "--- {}", old_label);
    let _ = writeln!(out, "+++ {}", new_label);
    for line in &lines {
        let prefix = match line.origin {
            LineOrigin::HunkHeader | LineOrigin::FileHeader => "",
            LineOrigin::Context => " ",
            LineOrigin::Deletion => "-",
            LineOrigin::Addition => "+",
        };
        let _ = writeln!(out, "{}{}", prefix, line.content);
        if line.missing_newline {
            out.push_str("\\ No newline at end of file\n");
        }
    }

    Ok(out)
}

/// Unified text for one file, including its `diff --git` line.
pub fn format_file_diff(file: &FileDiff) -> Result<String> {
    if !file.has_changes() {
        return Ok(String::new());
    }
    let path = file.path.display();
    let old_label = format!("a/{}", path);
    let new_label = format!("b/{}", path);
    let body = to_unified(
        &old_label,
        &new_label,
        &file.original,
        &file.edits,
        DEFAULT_CONTEXT,
    )?;
    Ok(format!("diff --git {} {}\n{}", old_label, new_label, body))
}

/// Concatenated unified text for a set of files.
pub fn combine_file_diffs(files: &[FileDiff]) -> Result<String> {
    let mut combined = String::new();
    for file in files {
        combined.push_str(&format_file_diff(file)?);
    }
    Ok(combined)
}
