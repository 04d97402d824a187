//! 2GIS raster tile layer.
//!
//! # URL Pattern
//!
//! `http://tile{0-4}.maps.2gis.com:80/tiles?x={x}&y={y}&z={z}`

use super::types::{MirrorRing, TileServer};
use crate::coord::TileHead;

const SUBDOMAINS: [&str; 5] = ["tile0", "tile1", "tile2", "tile3", "tile4"];
const DOMAIN: &str = ".maps.2gis.com";

/// 2GIS tile server with five mirrors and a query-string URL scheme.
#[derive(Debug)]
pub struct TwoGisTileServer {
    ring: MirrorRing,
}

impl TwoGisTileServer {
    pub fn new() -> Self {
        Self {
            ring: MirrorRing::new(&SUBDOMAINS, DOMAIN),
        }
    }
}

impl Default for TwoGisTileServer {
    fn default() -> Self {
        Self::new()
    }
}

impl TileServer for TwoGisTileServer {
    fn server_name(&self) -> &str {
        "2GIS"
    }

    fn server_port(&self) -> u16 {
        80
    }

    fn next_mirror(&self) -> &str {
        self.ring.next()
    }

    fn mirrors(&self) -> &[String] {
        self.ring.hosts()
    }

    fn tile_target(&self, head: &TileHead) -> String {
        format!("/tiles?x={}&y={}&z={}", head.x, head.y, head.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_target_is_query_string() {
        let server = TwoGisTileServer::new();
        assert_eq!(
            server.tile_target(&TileHead::new(12, 2475, 1280)),
            "/tiles?x=2475&y=1280&z=12"
        );
    }

    #[test]
    fn test_five_mirrors_rotate() {
        let server = TwoGisTileServer::new();
        let first: Vec<String> = (0..5).map(|_| server.next_mirror().to_string()).collect();
        assert_eq!(first[0], "tile0.maps.2gis.com");
        assert_eq!(first[4], "tile4.maps.2gis.com");
        assert_eq!(server.next_mirror(), "tile0.maps.2gis.com");
    }
}
