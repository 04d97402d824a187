//! OpenStreetMap standard tile layer.
//!
//! # URL Pattern
//!
//! `http://{a,b,c}.tile.openstreetmap.org:80/{z}/{x}/{y}.png`

use super::types::{MirrorRing, TileServer};
use crate::coord::TileHead;

const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];
const DOMAIN: &str = ".tile.openstreetmap.org";

/// OpenStreetMap tile server with three mirrors.
#[derive(Debug)]
pub struct OsmTileServer {
    ring: MirrorRing,
}

impl OsmTileServer {
    pub fn new() -> Self {
        Self {
            ring: MirrorRing::new(&SUBDOMAINS, DOMAIN),
        }
    }
}

impl Default for OsmTileServer {
    fn default() -> Self {
        Self::new()
    }
}

impl TileServer for OsmTileServer {
    fn server_name(&self) -> &str {
        "OpenStreetMap"
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
        format!("/{}/{}/{}.png", head.z, head.x, head.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_target() {
        let server = OsmTileServer::new();
        assert_eq!(server.tile_target(&TileHead::new(3, 4, 2)), "/3/4/2.png");
    }

    #[test]
    fn test_tile_url() {
        let server = OsmTileServer::new();
        let head = TileHead::new(10, 620, 320);
        assert_eq!(
            server.tile_url("b.tile.openstreetmap.org", &head),
            "http://b.tile.openstreetmap.org:80/10/620/320.png"
        );
    }

    #[test]
    fn test_mirrors() {
        let server = OsmTileServer::new();
        assert_eq!(server.mirrors().len(), 3);
        assert_eq!(server.next_mirror(), "a.tile.openstreetmap.org");
        assert_eq!(server.next_mirror(), "b.tile.openstreetmap.org");
        assert_eq!(server.next_mirror(), "c.tile.openstreetmap.org");
        assert_eq!(server.next_mirror(), "a.tile.openstreetmap.org");
    }
}
