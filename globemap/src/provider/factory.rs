//! Tile server factory.
//!
//! Maps a [`TileServerKind`] (from config, CLI or the globe API) to a
//! concrete [`TileServer`] instance.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::osm::OsmTileServer;
use super::twogis::TwoGisTileServer;
use super::types::TileServer;

/// Identifier of a supported tile server.
///
/// # Example
///
/// ```
/// use globemap::provider::{create_tile_server, TileServerKind};
///
/// let kind: TileServerKind = "2gis".parse().unwrap();
/// let server = create_tile_server(kind);
/// assert_eq!(server.server_name(), "2GIS");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileServerKind {
    /// OpenStreetMap standard layer.
    #[default]
    Osm,
    /// 2GIS raster layer.
    TwoGis,
}

impl TileServerKind {
    /// Every supported kind.
    pub fn all() -> &'static [TileServerKind] {
        &[TileServerKind::Osm, TileServerKind::TwoGis]
    }

    /// Config/CLI identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            TileServerKind::Osm => "osm",
            TileServerKind::TwoGis => "2gis",
        }
    }

    /// Creates the server described by this kind.
    pub fn create(&self) -> Arc<dyn TileServer> {
        match self {
            TileServerKind::Osm => Arc::new(OsmTileServer::new()),
            TileServerKind::TwoGis => Arc::new(TwoGisTileServer::new()),
        }
    }
}

impl fmt::Display for TileServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unknown server identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tile server '{0}' (expected one of: osm, 2gis)")]
pub struct UnknownTileServer(pub String);

impl FromStr for TileServerKind {
    type Err = UnknownTileServer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "osm" | "openstreetmap" => Ok(TileServerKind::Osm),
            "2gis" | "twogis" | "gis" => Ok(TileServerKind::TwoGis),
            other => Err(UnknownTileServer(other.to_string())),
        }
    }
}

/// Creates a tile server for the given kind.
pub fn create_tile_server(kind: TileServerKind) -> Arc<dyn TileServer> {
    kind.create()
}
