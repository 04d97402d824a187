//! Map generator
//!
//! Turns the current viewport and projection into a composited map texture
//! plus the triangle mesh that drapes it over the globe.
//!
//! # Regeneration
//!
//! ```text
//! ViewData + Projector snapshot
//!        │
//!        ▼
//!   visible_point ── None ──► empty map
//!        │ seed point
//!        ▼
//!   tile_at(seed, zoom) ──► discover_tiles (flood fill)
//!        │
//!        ▼
//!   TileTexture::layout ─┬─► TileRequester::request_tiles ──► TileBatch
//!                        └─► synthesize_geometry                  │
//!                                   │                             │
//!                                   └──────► composite_texture ◄──┘
//!                                                   │
//!                                                   ▼
//!                                        MapSink::map_updated
//! ```
//!
//! Regenerations are coalesced the same way tile batches are: one runs at
//! a time and at most one newer request waits behind it.

mod composite;
mod discovery;
mod geometry;
mod layout;
mod types;
mod visibility;
mod worker;

pub use composite::{composite_texture, decode_tile, CompositeError};
pub use discovery::{discover_tiles, tile_is_visible};
pub use geometry::{synthesize_geometry, VERTEX_STRIDE};
pub use layout::{TileBody, TileTexture};
pub use types::{MapSink, MapTexture, ViewProvider};
pub use visibility::visible_point;
pub use worker::{GeneratorChannel, GeneratorEvent, MapGenerator};

use crate::config::GeneratorConfig;
use crate::coord::tile_at;
use crate::projection::Projector;
use crate::view::ViewData;

/// Works out which tiles cover the view and where they go in the texture.
///
/// Returns `None` when nothing of the globe is on screen.
pub fn plan_layout(
    projector: &Projector,
    view: &ViewData,
    config: &GeneratorConfig,
) -> Option<TileTexture> {
    if view.is_empty() {
        return None;
    }
    let seed = visible_point(projector, view, config.edge_stride_px())?;
    let seed = tile_at(seed.lon, seed.lat, view.zoom);
    let heads = discover_tiles(projector, view, seed, config.max_tiles());
    Some(TileTexture::layout(&heads))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_covers_view() {
        let projector = Projector::new();
        let view = ViewData::from_viewport(512, 512, 1000.0, 0.001);
        let layout = plan_layout(&projector, &view, &GeneratorConfig::default()).unwrap();

        assert!(layout.tile_count() > 1);
        assert!(layout.heads().iter().all(|h| h.z == view.zoom));
        // The tile under the projection center is on screen
        assert!(layout.contains(&tile_at(0.0, 0.0, view.zoom)));
    }

    #[test]
    fn test_plan_nothing_visible() {
        let projector = Projector::new();
        let view = ViewData::default().panned(1.0e5, 1.0e5);
        assert!(plan_layout(&projector, &view, &GeneratorConfig::default()).is_none());
    }

    #[test]
    fn test_plan_respects_tile_cap() {
        let projector = Projector::new();
        let view = ViewData::from_viewport(2048, 2048, 1000.0, 0.001);
        let config = GeneratorConfig::default().with_max_tiles(7);
        let layout = plan_layout(&projector, &view, &config).unwrap();
        assert_eq!(layout.tile_count(), 7);
    }

    #[test]
    fn test_whole_globe_at_zoom_zero() {
        let projector = Projector::new();
        // 20000 km per pixel: the disk is a dot inside the view
        let view = ViewData::from_viewport(1024, 768, 2.0e7, 0.001);
        assert_eq!(view.zoom, 0);
        let layout = plan_layout(&projector, &view, &GeneratorConfig::default()).unwrap();
        assert_eq!(layout.heads(), &[crate::coord::TileHead::new(0, 0, 0)]);
    }
}
