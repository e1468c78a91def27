//! Refs offered for comparison on the ref selection screen.

use git2::{BranchType, ErrorCode, Oid, Repository, Sort};
use tracing::debug;

use crate::error::Result;
use crate::git::diff::{DiffSelection, has_staged_changes};

/// Commits listed after the branches.
pub const RECENT_COMMITS: usize = 10;
/// Longest commit summary shown before it is cut with an ellipsis.
const SUMMARY_WIDTH: usize = 50;
const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Staged,
    Branch,
    Commit,
}

impl RefKind {
    pub fn label(self) -> &'static str {
        match self {
            RefKind::Staged => "staged",
            RefKind::Branch => "branch",
            RefKind::Commit => "commit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    /// Shown in the list.
    pub name: String,
    /// Revision handed to git. Empty for the staged entry.
    pub rev: String,
    pub short_id: String,
    pub kind: RefKind,
}

impl RefEntry {
    pub fn staged() -> Self {
        Self {
            name: "Staged changes".to_string(),
            rev: String::new(),
            short_id: String::new(),
            kind: RefKind::Staged,
        }
    }

    /// How the ref is named in the PR front matter.
    pub fn label(&self) -> &str {
        match self.kind {
            RefKind::Staged => "staged",
            RefKind::Branch => &self.name,
            RefKind::Commit => &self.short_id,
        }
    }
}

/// The staged entry when the index differs from HEAD, the local branches
/// by name, then the most recent commits reachable from HEAD.
pub fn list_refs(repo: &Repository) -> Result<Vec<RefEntry>> {
    let mut refs = Vec::new();
    if has_staged_changes(repo)? {
        refs.push(RefEntry::staged());
    }
    refs.extend(local_branches(repo)?);
    refs.extend(recent_commits(repo, RECENT_COMMITS)?);

    debug!(refs = refs.len(), "listed refs");
    Ok(refs)
}

/// The diff between two picked refs. The staged entry on either side
/// compares the index with HEAD.
pub fn selection_between(base: &RefEntry, head: &RefEntry) -> DiffSelection {
    if base.kind == RefKind::Staged || head.kind == RefKind::Staged {
        return DiffSelection::Staged;
    }
    DiffSelection::Revisions {
        from: base.rev.clone(),
        to: head.rev.clone(),
    }
}

fn local_branches(repo: &Repository) -> Result<Vec<RefEntry>> {
    let mut entries = Vec::new();

    for branch in repo.branches(Some(BranchType::Local))? {
        let (branch, _) = branch?;
        // Names that are not UTF-8 cannot be passed back as a revision.
        let Some(name) = branch.name()? else {
            continue;
        };
        let Some(oid) = branch.get().target() else {
            continue;
        };
        entries.push(RefEntry {
            name: name.to_string(),
            rev: name.to_string(),
            short_id: short_id(oid),
            kind: RefKind::Branch,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn recent_commits(repo: &Repository, limit: usize) -> Result<Vec<RefEntry>> {
    match repo.head() {
        Ok(_) => {}
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    }

    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    walk.push_head()?;

    let mut entries = Vec::with_capacity(limit);
    for oid in walk.take(limit) {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        let short = short_id(oid);
        entries.push(RefEntry {
            name: format!("{} - {}", truncate_summary(commit.summary().unwrap_or("")), short),
            rev: oid.to_string(),
            short_id: short,
            kind: RefKind::Commit,
        });
    }
    Ok(entries)
}

fn short_id(oid: Oid) -> String {
    oid.to_string().chars().take(SHORT_ID_LEN).collect()
}

fn truncate_summary(summary: &str) -> String {
    if summary.chars().count() <= SUMMARY_WIDTH {
        return summary.to_string();
    }
    let cut: String = summary.chars().take(SUMMARY_WIDTH - 3).collect();
    format!("{}...", cut)
}
