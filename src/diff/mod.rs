//! Edit scripts and the diff line model built from them.

pub mod classify;
pub mod edits;
pub mod unified;

pub use classify::{classify_edits, classify_unified};
pub use edits::{apply_edits, compute_edits};
pub use unified::{DEFAULT_CONTEXT, combine_file_diffs, to_unified};
