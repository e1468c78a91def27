//! Side-by-side reflow: layout planning, pane building and row rendering.

pub mod ansi;
pub mod layout;
pub mod pane;
pub mod row;
pub mod spans;
pub mod text;

pub use layout::DisplayMode;
pub use pane::{PaneBuilder, PaneState};
pub use row::DisplayRow;
pub use text::{TextOptions, render_side_by_side_from_edits};
