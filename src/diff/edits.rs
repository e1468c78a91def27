//! Edit script production and application.
//!
//! Edit scripts are produced from a line diff (`similar`), so every
//! operation starts and ends on a line boundary of the original. Application
//! and classification accept arbitrary byte ranges as long as the script is
//! ordered, non-overlapping and lands on UTF-8 character boundaries.

use similar::{DiffOp, TextDiff};

use crate::error::{GitguyError, Result};
use crate::model::EditOperation;

/// Produce the edit script transforming `original` into `revised`.
///
/// Identical inputs yield an empty script.
pub fn compute_edits(original: &str, revised: &str) -> Vec<EditOperation> {
    if original == revised {
        return Vec::new();
    }

    let diff = TextDiff::from_lines(original, revised);
    let old_offsets = token_offsets(diff.old_slices());
    let new_offsets = token_offsets(diff.new_slices());

    let mut edits: Vec<EditOperation> = Vec::new();
    for op in diff.ops() {
        let (old_range, new_range) = match *op {
            DiffOp::Equal { .. } => continue,
            DiffOp::Delete {
                old_index,
                old_len,
                new_index,
            } => (old_index..old_index + old_len, new_index..new_index),
            DiffOp::Insert {
                old_index,
                new_index,
                new_len,
            } => (old_index..old_index, new_index..new_index + new_len),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => (old_index..old_index + old_len, new_index..new_index + new_len),
        };

        let start = old_offsets[old_range.start];
        let end = old_offsets[old_range.end];
        let replacement = &revised[new_offsets[new_range.start]..new_offsets[new_range.end]];

        // Touching operations collapse into one
        if let Some(last) = edits.last_mut()
            && last.end == start
        {
            last.end = end;
            last.replacement.push_str(replacement);
            continue;
        }

        edits.push(EditOperation::new(start, end, replacement));
    }

    edits
}

/// Apply an edit script to `original`, splicing operations in order.
pub fn apply_edits(original: &str, edits: &[EditOperation]) -> Result<String> {
    validate_edits(original, edits)?;

    let mut out = String::with_capacity(original.len());
    let mut cursor = 0;
    for edit in edits {
        out.push_str(&original[cursor..edit.start]);
        out.push_str(&edit.replacement);
        cursor = edit.end;
    }
    out.push_str(&original[cursor..]);

    Ok(out)
}

/// Check that a script is ordered, non-overlapping, in bounds and splits no
/// UTF-8 character.
pub fn validate_edits(original: &str, edits: &[EditOperation]) -> Result<()> {
    let mut cursor = 0;
    for edit in edits {
        let invalid = |reason| GitguyError::InvalidEdit {
            start: edit.start,
            end: edit.end,
            reason,
        };

        if edit.start > edit.end {
            return Err(invalid("start is after end"));
        }
        if edit.end > original.len() {
            return Err(invalid("range is out of bounds"));
        }
        if edit.start < cursor {
            return Err(invalid("overlaps or precedes the previous edit"));
        }
        if !original.is_char_boundary(edit.start) || !original.is_char_boundary(edit.end) {
            return Err(invalid("splits a UTF-8 character"));
        }
        cursor = edit.end;
    }
    Ok(())
}

fn token_offsets(tokens: &[&str]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(tokens.len() + 1);
    let mut pos = 0;
    offsets.push(pos);
    for token in tokens {
        pos += token.len();
        offsets.push(pos);
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(from: &str, to: &str) {
        let edits = compute_edits(from, to);
        let result = apply_edits(from, &edits).unwrap();
        assert_eq!(result, to, "edits {:?} did not reproduce target", edits);
    }

    #[test]
    fn should_round_trip_simple_changes() {
        round_trip("hello world", "hello beautiful world");
        round_trip("hello beautiful world", "hello world");
        round_trip("hello world", "hello universe");
        round_trip(
            "line 1\nline 2\nline 3",
            "line 1\nmodified line 2\nline 3\nline 4",
        );
    }

    #[test]
    fn should_round_trip_edge_cases() {
        round_trip("", "");
        round_trip("", "new file content\nwith multiple lines");
        round_trip("old content\nto drop\n", "");
        round_trip("\n\n\n", "\n\n");
        round_trip("a", "b");
        round_trip("content", "content\n");
        round_trip("content\n", "content");
        round_trip("a\r\nb\r\n", "a\r\nc\r\n");
    }

    #[test]
    fn should_round_trip_whitespace_and_unicode() {
        round_trip(
            "hello   world\n  indented line",
            "hello\tworld\n    indented line",
        );
        round_trip("hello 世界", "hello 世界 🌍");
        round_trip("line 1\n\nline 3", "line 1\nline 2\n\nline 3");
    }

    #[test]
    fn should_round_trip_large_content() {
        // given
        let from: String = (0..1000)
            .map(|i| format!("original line {} with some content\n", i))
            .collect();
        let to: String = (0..1000)
            .map(|i| {
                if i % 7 == 0 {
                    format!("modified line {} with some content\n", i)
                } else {
                    format!("original line {} with some content\n", i)
                }
            })
            .collect();

        // when
        let edits = compute_edits(&from, &to);

        // then
        assert!(edits.len() <= 1000);
        assert_eq!(apply_edits(&from, &edits).unwrap(), to);
    }

    #[test]
    fn should_return_empty_script_for_identical_content() {
        assert!(compute_edits("same content", "same content").is_empty());
    }

    #[test]
    fn should_produce_ordered_non_overlapping_edits() {
        let edits = compute_edits("a\nb\nc\nd\ne\n", "a\nB\nc\nD\ne\nf\n");
        assert!(edits.len() >= 2);
        for pair in edits.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn should_reject_out_of_bounds_edit() {
        let edits = vec![EditOperation::new(2, 50, "x")];
        assert!(matches!(
            apply_edits("short", &edits),
            Err(GitguyError::InvalidEdit { .. })
        ));
    }

    #[test]
    fn should_reject_overlapping_edits() {
        let edits = vec![EditOperation::new(0, 3, "x"), EditOperation::new(2, 4, "y")];
        assert!(apply_edits("abcdef", &edits).is_err());
    }

    #[test]
    fn should_reject_edit_inside_multibyte_char() {
        let edits = vec![EditOperation::new(1, 2, "x")];
        assert!(apply_edits("世界", &edits).is_err());
    }
}
