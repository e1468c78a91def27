use git2::{Repository, Status, StatusOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::diff::compute_edits;
use crate::error::{GitguyError, Result};
use crate::git::repository::{ContentSource, FileContent, RepoContent, Snapshot};
use crate::model::{FileDiff, FileStatus};

/// Which changes a diff covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSelection {
    /// Index against HEAD.
    Staged,
    /// Working tree against HEAD, for files with unstaged edits.
    Unstaged,
    /// Unstaged if there are any, else staged.
    Default,
    Revisions { from: String, to: String },
}

pub fn load_file_diffs(repo: &Repository, selection: &DiffSelection) -> Result<Vec<FileDiff>> {
    match selection {
        DiffSelection::Staged => get_staged_diffs(repo),
        DiffSelection::Unstaged => get_unstaged_diffs(repo),
        DiffSelection::Default => get_default_diffs(repo),
        DiffSelection::Revisions { from, to } => get_revision_diffs(repo, from, to),
    }
}

fn staged_status() -> Status {
    Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE
}

pub fn has_staged_changes(repo: &Repository) -> Result<bool> {
    Ok(!status_paths(repo, staged_status())?.is_empty())
}

pub fn get_staged_diffs(repo: &Repository) -> Result<Vec<FileDiff>> {
    let paths = status_paths(repo, staged_status())?;
    let source = RepoContent::new(repo, Snapshot::head(repo), Snapshot::index(repo)?);
    build_file_diffs(&paths, &source)
}

pub fn get_unstaged_diffs(repo: &Repository) -> Result<Vec<FileDiff>> {
    let paths = status_paths(
        repo,
        Status::WT_MODIFIED | Status::WT_DELETED | Status::WT_RENAMED | Status::WT_TYPECHANGE,
    )?;
    let source = RepoContent::new(repo, Snapshot::head(repo), Snapshot::workdir(repo)?);
    build_file_diffs(&paths, &source)
}

/// Unstaged changes when there are any, otherwise staged ones.
pub fn get_default_diffs(repo: &Repository) -> Result<Vec<FileDiff>> {
    let unstaged = get_unstaged_diffs(repo)?;
    if !unstaged.is_empty() {
        return Ok(unstaged);
    }

    let staged = get_staged_diffs(repo)?;
    if staged.is_empty() {
        return Err(GitguyError::NoChanges);
    }
    Ok(staged)
}

/// Changes between the trees of two revisions.
pub fn get_revision_diffs(repo: &Repository, from: &str, to: &str) -> Result<Vec<FileDiff>> {
    let base = Snapshot::revision(repo, from)?;
    let target = Snapshot::revision(repo, to)?;

    let paths = match (&base, &target) {
        (Snapshot::Tree(old), Snapshot::Tree(new)) => {
            let diff = repo.diff_tree_to_tree(Some(old), Some(new), None)?;
            let mut paths: Vec<PathBuf> = diff
                .deltas()
                .filter_map(|delta| {
                    delta
                        .new_file()
                        .path()
                        .or_else(|| delta.old_file().path())
                        .map(PathBuf::from)
                })
                .collect();
            paths.sort();
            paths.dedup();
            paths
        }
        _ => Vec::new(),
    };

    let source = RepoContent::new(repo, base, target);
    build_file_diffs(&paths, &source)
}

fn status_paths(repo: &Repository, wanted: Status) -> Result<Vec<PathBuf>> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(false);
    opts.include_ignored(false);

    let statuses = repo.statuses(Some(&mut opts))?;
    let mut paths: Vec<PathBuf> = statuses
        .iter()
        .filter(|entry| entry.status().intersects(wanted))
        .filter_map(|entry| entry.path().map(PathBuf::from))
        .collect();
    paths.sort();
    Ok(paths)
}

/// One `FileDiff` per path whose sides differ. Binary files and files that
/// cannot be read are skipped.
pub fn build_file_diffs(paths: &[PathBuf], source: &impl ContentSource) -> Result<Vec<FileDiff>> {
    let mut files = Vec::new();

    for path in paths {
        let sides = source
            .original(path)
            .and_then(|original| Ok((original, source.revised(path)?)));
        let (original, revised) = match sides {
            Ok(sides) => sides,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };

        if let Some(file) = file_diff(path, original, revised) {
            files.push(file);
        }
    }

    debug!(files = files.len(), "built file diffs");
    Ok(files)
}

fn file_diff(path: &Path, original: FileContent, revised: FileContent) -> Option<FileDiff> {
    let (status, original, revised) = match (original, revised) {
        (FileContent::Binary, _) | (_, FileContent::Binary) => {
            debug!(path = %path.display(), "skipping binary file");
            return None;
        }
        (FileContent::Missing, FileContent::Missing) => return None,
        (FileContent::Missing, FileContent::Text(new)) => (FileStatus::Added, String::new(), new),
        (FileContent::Text(old), FileContent::Missing) => {
            (FileStatus::Deleted, old, String::new())
        }
        (FileContent::Text(old), FileContent::Text(new)) => (FileStatus::Modified, old, new),
    };

    let edits = compute_edits(&original, &revised);
    if edits.is_empty() {
        return None;
    }

    Some(FileDiff {
        path: path.to_path_buf(),
        status,
        original,
        revised,
        edits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::apply_edits;
    use crate::git::repository::test_support::*;

    #[test]
    fn should_return_no_changes_for_clean_repo() {
        // given
        let (dir, repo) = init_repo();
        write(dir.path(), "a.txt", "content\n");
        commit_all(&repo, "initial");

        // when
        let result = get_default_diffs(&repo);

        // then
        assert!(matches!(result, Err(GitguyError::NoChanges)));
    }

    #[test]
    fn should_diff_unstaged_against_head() {
        // given
        let (dir, repo) = init_repo();
        write(dir.path(), "a.txt", "one\ntwo\n");
        commit_all(&repo, "initial");
        write(dir.path(), "a.txt", "one\n2\n");

        // when
        let files = get_unstaged_diffs(&repo).unwrap();

        // then
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("a.txt"));
        assert_eq!(files[0].status, FileStatus::Modified);
        assert_eq!(
            apply_edits(&files[0].original, &files[0].edits).unwrap(),
            "one\n2\n"
        );
    }

    #[test]
    fn should_prefer_unstaged_then_fall_back_to_staged() {
        // given: a staged-only change
        let (dir, repo) = init_repo();
        write(dir.path(), "a.txt", "one\n");
        commit_all(&repo, "initial");
        write(dir.path(), "new.txt", "fresh\n");
        stage_all(&repo);

        // when
        let staged_only = get_default_diffs(&repo).unwrap();
        write(dir.path(), "a.txt", "changed\n");
        let with_unstaged = get_default_diffs(&repo).unwrap();

        // then
        assert_eq!(staged_only.len(), 1);
        assert_eq!(staged_only[0].status, FileStatus::Added);
        assert_eq!(staged_only[0].original, "");
        assert_eq!(with_unstaged.len(), 1);
        assert_eq!(with_unstaged[0].path, PathBuf::from("a.txt"));
    }

    #[test]
    fn should_report_deleted_file() {
        let (dir, repo) = init_repo();
        write(dir.path(), "gone.txt", "bye\n");
        commit_all(&repo, "initial");
        std::fs::remove_file(dir.path().join("gone.txt")).unwrap();

        let files = get_unstaged_diffs(&repo).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].status, FileStatus::Deleted);
        assert_eq!(files[0].revised, "");
    }

    #[test]
    fn should_diff_between_revisions() {
        // given
        let (dir, repo) = init_repo();
        write(dir.path(), "a.txt", "v1\n");
        write(dir.path(), "b.txt", "same\n");
        let first = commit_all(&repo, "first");
        write(dir.path(), "a.txt", "v2\n");
        write(dir.path(), "c/d.rs", "fn main() {}\n");
        let second = commit_all(&repo, "second");

        // when
        let files =
            get_revision_diffs(&repo, &first.to_string(), &second.to_string()).unwrap();

        // then
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("a.txt"), PathBuf::from("c/d.rs")]);
        assert_eq!(files[1].status, FileStatus::Added);
    }

    #[test]
    fn should_skip_binary_files() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("img.bin"), b"\0\x01\x02").unwrap();
        commit_all(&repo, "initial");
        std::fs::write(dir.path().join("img.bin"), b"\0\x03\x04").unwrap();

        let files = get_unstaged_diffs(&repo).unwrap();

        assert!(files.is_empty());
    }
}
