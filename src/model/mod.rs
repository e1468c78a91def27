pub mod diff_types;

pub use diff_types::{ClassifiedLine, EditOperation, FileDiff, FileStatus, LineOrigin};
