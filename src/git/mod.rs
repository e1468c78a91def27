pub mod diff;
pub mod refs;
pub mod repository;

pub use diff::{DiffSelection, load_file_diffs};
pub use refs::{RefEntry, list_refs, selection_between};
pub use repository::RepoInfo;
