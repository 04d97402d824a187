//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[server]
; Tile server:
;   osm  - OpenStreetMap standard layer (a/b/c mirrors)
;   2gis - 2GIS raster layer (tile0-tile4 mirrors)
kind = {}

[cache]
; Tiles are stored as <directory>/<server>/<z>/<x>/<y>.png
; Files are never expired; delete the directory to refetch.
directory = {}

[network]
; Worker threads fetching tiles (default: 4)
workers = {}
; Seconds to establish a connection before the tile is abandoned (default: 5)
connect_timeout = {}
; Seconds for a whole request (default: 30)
request_timeout = {}
; Retries on another mirror when a host is unreachable (default: 2)
max_retries = {}
; User-Agent header; tile servers reject requests without one
user_agent = {}

[generator]
; Sub-quads per tile edge in the overlay mesh (default: 10)
subdivisions = {}
; Pixel stride when probing view edges for a visible point (default: 10)
edge_stride_px = {}
; Upper bound on tiles per regeneration (default: 1024)
max_tiles = {}

[logging]
; Log file, truncated at start-up. Verbosity via RUST_LOG.
file = {}
"#,
        config.server.kind,
        path_to_string(&config.cache.directory),
        config.network.workers,
        config.network.connect_timeout,
        config.network.request_timeout,
        config.network.max_retries,
        config.network.user_agent,
        config.generator.subdivisions,
        config.generator.edge_stride_px,
        config.generator.max_tiles,
        path_to_string(&config.logging.file),
    )
}

/// Render a path, abbreviating the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
