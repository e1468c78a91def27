//! Line classification.
//!
//! Two inputs produce the same `ClassifiedLine` stream: an edit script over
//! the original text, or unified-diff text.

use tracing::debug;

use crate::diff::edits::validate_edits;
use crate::error::Result;
use crate::model::{ClassifiedLine, EditOperation, LineOrigin};

/// A contiguous rewritten region of the original, widened to whole lines.
struct Block {
    start: usize,
    end: usize,
    new_text: String,
}

/// Classify an edit script against the original text.
///
/// With `context: Some(n)` the output is grouped into hunks, each preceded by
/// a `@@ -a,b +c,d @@` header and carrying at most `n` context lines around
/// changes. With `None` the whole file is emitted without headers.
pub fn classify_edits(
    original: &str,
    edits: &[EditOperation],
    context: Option<usize>,
) -> Result<Vec<ClassifiedLine>> {
    validate_edits(original, edits)?;

    let blocks = line_blocks(original, edits);

    let mut lines = Vec::new();
    let mut old_lineno = 1u32;
    let mut new_lineno = 1u32;
    let mut pos = 0;

    for block in &blocks {
        for (text, missing_newline) in split_lines(&original[pos..block.start]) {
            let mut line = ClassifiedLine::context(text, old_lineno, new_lineno);
            line.missing_newline = missing_newline;
            lines.push(line);
            old_lineno += 1;
            new_lineno += 1;
        }
        for (text, missing_newline) in split_lines(&original[block.start..block.end]) {
            let mut line = ClassifiedLine::deletion(text, old_lineno);
            line.missing_newline = missing_newline;
            lines.push(line);
            old_lineno += 1;
        }
        for (text, missing_newline) in split_lines(&block.new_text) {
            let mut line = ClassifiedLine::addition(text, new_lineno);
            line.missing_newline = missing_newline;
            lines.push(line);
            new_lineno += 1;
        }
        pos = block.end;
    }
    for (text, missing_newline) in split_lines(&original[pos..]) {
        let mut line = ClassifiedLine::context(text, old_lineno, new_lineno);
        line.missing_newline = missing_newline;
        lines.push(line);
        old_lineno += 1;
        new_lineno += 1;
    }

    Ok(match context {
        Some(radius) => into_hunks(lines, radius),
        None => lines,
    })
}

/// Merge edits into line-aligned blocks. Edits sharing a line end up in the
/// same block so every block replaces whole original lines.
fn line_blocks(original: &str, edits: &[EditOperation]) -> Vec<Block> {
    let starts = line_starts(original);
    let len = original.len();

    let mut blocks: Vec<Block> = Vec::new();
    let mut i = 0;
    while i < edits.len() {
        // Never reach back into the previous block.
        let prev_end = blocks.last().map_or(0, |b| b.end);
        let start = line_start_of(original, &starts, edits[i].start).max(prev_end);
        let mut new_text = String::from(&original[start..edits[i].start]);
        let mut cursor = edits[i].start;

        let end = loop {
            let edit = &edits[i];
            new_text.push_str(&original[cursor..edit.start]);
            new_text.push_str(&edit.replacement);
            cursor = edit.end;
            i += 1;

            let dangling = !new_text.is_empty() && !new_text.ends_with('\n');
            let end = if cursor >= len {
                len
            } else if starts.binary_search(&cursor).is_ok() && !dangling {
                cursor
            } else {
                line_end_of(&starts, len, cursor)
            };

            // An edit touching the block's end joins it.
            if i < edits.len() && edits[i].start <= end {
                continue;
            }
            break end;
        };

        new_text.push_str(&original[cursor..end]);
        blocks.push(Block {
            start,
            end,
            new_text,
        });
    }

    blocks
}

fn line_starts(text: &str) -> Vec<usize> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut starts = vec![0];
    starts.extend(
        text.match_indices('\n')
            .map(|(idx, _)| idx + 1)
            .filter(|&idx| idx < text.len()),
    );
    starts
}

fn line_start_of(text: &str, starts: &[usize], offset: usize) -> usize {
    if offset >= text.len() && (text.is_empty() || text.ends_with('\n')) {
        return text.len();
    }
    let offset = offset.min(text.len().saturating_sub(1));
    let idx = starts.partition_point(|&s| s <= offset).saturating_sub(1);
    starts.get(idx).copied().unwrap_or(0)
}

fn line_end_of(starts: &[usize], len: usize, offset: usize) -> usize {
    let idx = starts.partition_point(|&s| s <= offset);
    starts.get(idx).copied().unwrap_or(len)
}

/// Split into lines without terminators. The flag marks a final line with no
/// trailing newline.
fn split_lines(text: &str) -> Vec<(&str, bool)> {
    if text.is_empty() {
        return Vec::new();
    }
    let terminated = text.ends_with('\n');
    let body = if terminated {
        &text[..text.len() - 1]
    } else {
        text
    };
    let mut lines: Vec<(&str, bool)> = body
        .split('\n')
        .map(|line| (line.strip_suffix('\r').unwrap_or(line), false))
        .collect();
    if !terminated && let Some(last) = lines.last_mut() {
        last.1 = true;
    }
    lines
}

fn into_hunks(lines: Vec<ClassifiedLine>, radius: usize) -> Vec<ClassifiedLine> {
    let changes: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.origin != LineOrigin::Context)
        .map(|(idx, _)| idx)
        .collect();

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for idx in changes {
        let lo = idx.saturating_sub(radius);
        let hi = (idx + radius + 1).min(lines.len());
        match ranges.last_mut() {
            Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
            _ => ranges.push((lo, hi)),
        }
    }

    // Lines of each side preceding every index
    let mut old_before = Vec::with_capacity(lines.len());
    let mut new_before = Vec::with_capacity(lines.len());
    let (mut old_seen, mut new_seen) = (0u32, 0u32);
    for line in &lines {
        old_before.push(old_seen);
        new_before.push(new_seen);
        if line.origin != LineOrigin::Addition {
            old_seen += 1;
        }
        if line.origin != LineOrigin::Deletion {
            new_seen += 1;
        }
    }

    let mut out = Vec::with_capacity(lines.len() + ranges.len());
    for (lo, hi) in ranges {
        let slice = &lines[lo..hi];
        let old_count = slice
            .iter()
            .filter(|l| l.origin != LineOrigin::Addition)
            .count() as u32;
        let new_count = slice
            .iter()
            .filter(|l| l.origin != LineOrigin::Deletion)
            .count() as u32;
        let header = format!(
            "@@ -{} +{} @@",
            format_range(old_before[lo], old_count),
            format_range(new_before[lo], new_count)
        );
        out.push(ClassifiedLine::header(LineOrigin::HunkHeader, header));
        out.extend(slice.iter().cloned());
    }
    out
}

fn format_range(before: u32, count: u32) -> String {
    match count {
        0 => format!("{},0", before),
        1 => format!("{}", before + 1),
        n => format!("{},{}", before + 1, n),
    }
}

/// Classify unified-diff text.
///
/// File headers (`diff --git`, `---`, `+++`) and hunk headers become header
/// pseudo-lines; other metadata and `\ No newline` markers are dropped.
/// Malformed hunk headers fall back to line 1 and prefix-based parsing.
pub fn classify_unified(text: &str) -> Vec<ClassifiedLine> {
    let mut lines = Vec::new();

    let mut old_lineno = 1u32;
    let mut new_lineno = 1u32;
    let mut in_hunk = false;
    // Lines left in the current hunk, when its header could be parsed
    let mut remaining: Option<(u32, u32)> = None;

    for raw in text.lines() {
        if let Some((old_left, new_left)) = remaining
            && old_left == 0
            && new_left == 0
        {
            in_hunk = false;
            remaining = None;
        }

        if raw.starts_with("diff ") {
            in_hunk = false;
            remaining = None;
            lines.push(ClassifiedLine::header(LineOrigin::FileHeader, raw));
            continue;
        }

        if raw.starts_with("@@") {
            let header = parse_hunk_header(raw);
            if header.is_none() {
                debug!(line = raw, "malformed hunk header, numbering from 1");
            }
            let header = header.unwrap_or_default();
            old_lineno = header.old_start.unwrap_or(1);
            new_lineno = header.new_start.unwrap_or(1);
            remaining = header.old_count.zip(header.new_count);
            in_hunk = true;
            lines.push(ClassifiedLine::header(LineOrigin::HunkHeader, raw));
            continue;
        }

        let counted = remaining.is_some();
        if (!in_hunk || !counted) && (raw.starts_with("---") || raw.starts_with("+++")) {
            lines.push(ClassifiedLine::header(LineOrigin::FileHeader, raw));
            continue;
        }

        if !in_hunk || raw.starts_with('\\') {
            continue;
        }

        let line = if let Some(content) = raw.strip_prefix('-') {
            let line = ClassifiedLine::deletion(content, old_lineno);
            old_lineno += 1;
            if let Some((old_left, _)) = remaining.as_mut() {
                *old_left = old_left.saturating_sub(1);
            }
            line
        } else if let Some(content) = raw.strip_prefix('+') {
            let line = ClassifiedLine::addition(content, new_lineno);
            new_lineno += 1;
            if let Some((_, new_left)) = remaining.as_mut() {
                *new_left = new_left.saturating_sub(1);
            }
            line
        } else if raw.is_empty() || raw.starts_with(' ') {
            let content = raw.strip_prefix(' ').unwrap_or("");
            let line = ClassifiedLine::context(content, old_lineno, new_lineno);
            old_lineno += 1;
            new_lineno += 1;
            if let Some((old_left, new_left)) = remaining.as_mut() {
                *old_left = old_left.saturating_sub(1);
                *new_left = new_left.saturating_sub(1);
            }
            line
        } else {
            continue;
        };
        lines.push(line);
    }

    lines
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: Option<u32>,
    pub old_count: Option<u32>,
    pub new_start: Option<u32>,
    pub new_count: Option<u32>,
}

/// Parse `@@ -old_start[,old_count] +new_start[,new_count] @@`.
///
/// Returns `None` when the line is not shaped like a hunk header at all;
/// individual unparsable numbers come back as `None` fields.
pub fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 || parts[0] != "@@" {
        return None;
    }

    let old = parts[1].strip_prefix('-')?;
    let new = parts[2].strip_prefix('+')?;
    let (old_start, old_count) = parse_range(old);
    let (new_start, new_count) = parse_range(new);

    Some(HunkHeader {
        old_start,
        old_count,
        new_start,
        new_count,
    })
}

fn parse_range(s: &str) -> (Option<u32>, Option<u32>) {
    match s.split_once(',') {
        Some((start, count)) => (start.parse().ok(), count.parse().ok()),
        None => (s.parse().ok(), Some(1)),
    }
}
