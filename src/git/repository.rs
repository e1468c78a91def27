use git2::{Blob, Index, Repository, Tree};
use std::path::{Path, PathBuf};

use crate::error::{GitguyError, Result};

/// Bytes sniffed for NUL when deciding whether a worktree file is binary.
const BINARY_SNIFF_LEN: usize = 8000;

pub struct RepoInfo {
    pub repo: Repository,
    pub root_path: PathBuf,
    pub head_commit: String,
    pub branch_name: Option<String>,
}

impl RepoInfo {
    pub fn discover() -> Result<Self> {
        Self::discover_at(Path::new("."))
    }

    pub fn discover_at(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|_| GitguyError::NotARepository)?;

        let root_path = repo
            .workdir()
            .ok_or(GitguyError::NotARepository)?
            .to_path_buf();

        let head_commit = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .map(|c| c.id().to_string())
            .unwrap_or_else(|| "HEAD".to_string());

        let branch_name = repo.head().ok().and_then(|h| {
            if h.is_branch() {
                h.shorthand().map(|s| s.to_string())
            } else {
                None
            }
        });

        Ok(Self {
            repo,
            root_path,
            head_commit,
            branch_name,
        })
    }

    pub fn short_head(&self) -> &str {
        &self.head_commit[..7.min(self.head_commit.len())]
    }
}

/// One side of a file as stored in some snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Missing,
    Binary,
    Text(String),
}

/// Supplies the two sides of a comparison for a path.
pub trait ContentSource {
    fn original(&self, path: &Path) -> Result<FileContent>;
    fn revised(&self, path: &Path) -> Result<FileContent>;
}

/// A readable state of the repository.
pub enum Snapshot<'r> {
    /// Nothing committed yet.
    Empty,
    Tree(Tree<'r>),
    Index(Index),
    Workdir(PathBuf),
}

impl<'r> Snapshot<'r> {
    pub fn head(repo: &'r Repository) -> Self {
        repo.head()
            .ok()
            .and_then(|h| h.peel_to_tree().ok())
            .map(Snapshot::Tree)
            .unwrap_or(Snapshot::Empty)
    }

    pub fn index(repo: &Repository) -> Result<Self> {
        Ok(Snapshot::Index(repo.index()?))
    }

    pub fn workdir(repo: &Repository) -> Result<Self> {
        let root = repo.workdir().ok_or(GitguyError::NotARepository)?;
        Ok(Snapshot::Workdir(root.to_path_buf()))
    }

    /// The tree a revision (branch, tag, hash, `HEAD~2`) points at.
    pub fn revision(repo: &'r Repository, rev: &str) -> Result<Self> {
        let tree = repo.revparse_single(rev)?.peel_to_tree()?;
        Ok(Snapshot::Tree(tree))
    }

    pub fn read(&self, repo: &Repository, path: &Path) -> Result<FileContent> {
        match self {
            Snapshot::Empty => Ok(FileContent::Missing),
            Snapshot::Tree(tree) => {
                let entry = match tree.get_path(path) {
                    Ok(entry) => entry,
                    Err(e) if e.code() == git2::ErrorCode::NotFound => {
                        return Ok(FileContent::Missing);
                    }
                    Err(e) => return Err(e.into()),
                };
                let blob = entry.to_object(repo)?.peel_to_blob()?;
                Ok(blob_content(&blob))
            }
            Snapshot::Index(index) => match index.get_path(path, 0) {
                Some(entry) => Ok(blob_content(&repo.find_blob(entry.id)?)),
                None => Ok(FileContent::Missing),
            },
            Snapshot::Workdir(root) => {
                let full = root.join(path);
                if !full.is_file() {
                    return Ok(FileContent::Missing);
                }
                let bytes = std::fs::read(&full)?;
                Ok(bytes_content(&bytes))
            }
        }
    }
}

/// Compares two snapshots of one repository.
pub struct RepoContent<'r> {
    repo: &'r Repository,
    base: Snapshot<'r>,
    target: Snapshot<'r>,
}

impl<'r> RepoContent<'r> {
    pub fn new(repo: &'r Repository, base: Snapshot<'r>, target: Snapshot<'r>) -> Self {
        Self { repo, base, target }
    }
}

impl ContentSource for RepoContent<'_> {
    fn original(&self, path: &Path) -> Result<FileContent> {
        self.base.read(self.repo, path)
    }

    fn revised(&self, path: &Path) -> Result<FileContent> {
        self.target.read(self.repo, path)
    }
}

fn blob_content(blob: &Blob) -> FileContent {
    if blob.is_binary() {
        FileContent::Binary
    } else {
        FileContent::Text(String::from_utf8_lossy(blob.content()).into_owned())
    }
}

fn bytes_content(bytes: &[u8]) -> FileContent {
    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        FileContent::Binary
    } else {
        FileContent::Text(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use git2::{IndexAddOption, Repository, Signature};
    use std::path::Path;
    use tempfile::TempDir;

    pub fn init_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    pub fn write(dir: &Path, path: &str, content: &str) {
        let full = dir.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    pub fn stage_all(repo: &Repository) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();
    }

    pub fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
        stage_all(repo);
        let mut index = repo.index().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test User", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn should_fail_outside_repository() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = RepoInfo::discover_at(dir.path());
        assert!(matches!(result, Err(GitguyError::NotARepository)));
    }

    #[test]
    fn should_read_each_snapshot() {
        // given
        let (dir, repo) = init_repo();
        write(dir.path(), "a.txt", "committed\n");
        commit_all(&repo, "initial");
        write(dir.path(), "a.txt", "staged\n");
        stage_all(&repo);
        write(dir.path(), "a.txt", "working\n");
        let path = Path::new("a.txt");

        // when
        let head = Snapshot::head(&repo).read(&repo, path).unwrap();
        let index = Snapshot::index(&repo).unwrap().read(&repo, path).unwrap();
        let work = Snapshot::workdir(&repo).unwrap().read(&repo, path).unwrap();

        // then
        assert_eq!(head, FileContent::Text("committed\n".into()));
        assert_eq!(index, FileContent::Text("staged\n".into()));
        assert_eq!(work, FileContent::Text("working\n".into()));
    }

    #[test]
    fn should_report_missing_paths() {
        let (dir, repo) = init_repo();
        write(dir.path(), "a.txt", "x\n");
        commit_all(&repo, "initial");

        let missing = Snapshot::head(&repo)
            .read(&repo, Path::new("nope.txt"))
            .unwrap();
        let unborn = Snapshot::Empty.read(&repo, Path::new("a.txt")).unwrap();

        assert_eq!(missing, FileContent::Missing);
        assert_eq!(unborn, FileContent::Missing);
    }

    #[test]
    fn should_detect_binary_worktree_file() {
        assert_eq!(bytes_content(b"PNG\0\x01\x02"), FileContent::Binary);
        assert_eq!(bytes_content(b"text"), FileContent::Text("text".into()));
    }

    #[test]
    fn should_discover_branch_and_head() {
        let (dir, repo) = init_repo();
        write(dir.path(), "a.txt", "x\n");
        let oid = commit_all(&repo, "initial");

        let info = RepoInfo::discover_at(dir.path()).unwrap();

        assert_eq!(info.head_commit, oid.to_string());
        assert_eq!(info.short_head().len(), 7);
        assert!(info.branch_name.is_some());
    }
}
