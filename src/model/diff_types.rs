use std::path::{Path, PathBuf};

/// A single replace-range transformation over the original text.
///
/// `start` and `end` are byte offsets into the original; `replacement` is
/// spliced in place of `original[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl EditOperation {
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
}

impl FileStatus {
    pub fn as_char(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    Context,
    Deletion,
    Addition,
    /// `@@ -a,b +c,d @@`
    HunkHeader,
    /// `diff --git`, `---` and `+++`
    FileHeader,
}

impl LineOrigin {
    pub fn is_header(&self) -> bool {
        matches!(self, LineOrigin::HunkHeader | LineOrigin::FileHeader)
    }
}

/// One line of a diff, stripped of its prefix and tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub origin: LineOrigin,
    pub content: String,
    pub old_lineno: Option<u32>,
    pub new_lineno: Option<u32>,
    /// Last line of its side with no trailing newline.
    pub missing_newline: bool,
}

impl ClassifiedLine {
    pub fn context(content: impl Into<String>, old_lineno: u32, new_lineno: u32) -> Self {
        Self {
            origin: LineOrigin::Context,
            content: content.into(),
            old_lineno: Some(old_lineno),
            new_lineno: Some(new_lineno),
            missing_newline: false,
        }
    }

    pub fn deletion(content: impl Into<String>, old_lineno: u32) -> Self {
        Self {
            origin: LineOrigin::Deletion,
            content: content.into(),
            old_lineno: Some(old_lineno),
            new_lineno: None,
            missing_newline: false,
        }
    }

    pub fn addition(content: impl Into<String>, new_lineno: u32) -> Self {
        Self {
            origin: LineOrigin::Addition,
            content: content.into(),
            old_lineno: None,
            new_lineno: Some(new_lineno),
            missing_newline: false,
        }
    }

    pub fn header(origin: LineOrigin, content: impl Into<String>) -> Self {
        debug_assert!(origin.is_header());
        Self {
            origin,
            content: content.into(),
            old_lineno: None,
            new_lineno: None,
            missing_newline: false,
        }
    }

    /// Non-empty content that trims to nothing, e.g. a tabs-vs-spaces change.
    /// A genuinely empty line is not whitespace-only.
    pub fn is_whitespace_only(&self) -> bool {
        !self.content.is_empty() && self.content.trim().is_empty()
    }
}

/// Both revisions of one file plus the edit script between them.
#[derive(Debug, Clone)]
pub struct FileDiff {
    pub path: PathBuf,
    pub status: FileStatus,
    pub original: String,
    pub revised: String,
    pub edits: Vec<EditOperation>,
}

impl FileDiff {
    pub fn display_path(&self) -> &Path {
        &self.path
    }

    pub fn has_changes(&self) -> bool {
        !self.edits.is_empty()
    }
}
