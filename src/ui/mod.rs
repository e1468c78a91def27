pub mod app_layout;
pub mod styles;

pub use app_layout::render;
