//! Cache path construction.

use crate::coord::TileHead;
use std::path::{Path, PathBuf};

/// Construct the full path for a cached tile.
///
/// ```text
/// <cache_dir>/<server>/<z>/<x>/<y>.png
/// ```
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use globemap::cache::tile_path;
/// use globemap::coord::TileHead;
///
/// let path = tile_path(&PathBuf::from("/cache"), "OpenStreetMap", &TileHead::new(15, 5279, 12754));
/// assert_eq!(path, PathBuf::from("/cache/OpenStreetMap/15/5279/12754.png"));
/// ```
pub fn tile_path(cache_dir: &Path, server: &str, head: &TileHead) -> PathBuf {
    column_directory(cache_dir, server, head).join(format!("{}.png", head.y))
}

/// Directory holding every cached row of one `(server, z, x)` column.
pub fn column_directory(cache_dir: &Path, server: &str, head: &TileHead) -> PathBuf {
    cache_dir
        .join(server)
        .join(head.z.to_string())
        .join(head.x.to_string())
}
