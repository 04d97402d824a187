//! Tile server abstraction
//!
//! A [`TileServer`] describes one remote tile provider: host name, port,
//! URL scheme and a mirror-cycling policy. [`AsyncHttpClient`] is the narrow
//! HTTP surface used to fetch a tile body from a mirror.
//!
//! # Factory
//!
//! ```
//! use globemap::coord::TileHead;
//! use globemap::provider::TileServerKind;
//!
//! let server = TileServerKind::Osm.create();
//! let mirror = server.next_mirror().to_string();
//! let url = server.tile_url(&mirror, &TileHead::new(2, 1, 1));
//! assert!(url.ends_with("/2/1/1.png"));
//! ```

mod factory;
mod http;
mod osm;
mod twogis;
mod types;

pub use factory::{create_tile_server, TileServerKind, UnknownTileServer};
pub use http::{AsyncHttpClient, FetchError, ReqwestClient, DEFAULT_USER_AGENT};
pub use osm::OsmTileServer;
pub use twogis::TwoGisTileServer;
pub use types::{MirrorRing, TileServer};

#[cfg(test)]
pub use http::tests::{MockAsyncHttpClient, ScriptedHttpClient};
