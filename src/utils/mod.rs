pub mod logging;
pub mod text;

pub use text::{preview, single_line, truncate_chars};
