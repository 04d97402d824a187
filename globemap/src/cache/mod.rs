//! Disk cache for fetched tiles.
//!
//! Layout: `<root>/<server name>/<z>/<x>/<y>.png`.

mod disk;
mod path;

pub use disk::{CacheError, DiskTileCache};
pub use path::{column_directory, tile_path};
