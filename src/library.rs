//! Playlist sources: turning files and directories into `Track`s.

mod model;
mod scan;

pub use model::Track;
pub use scan::collect;
