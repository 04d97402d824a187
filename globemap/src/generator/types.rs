//! Generator inputs and outputs.

use std::fmt;

use super::geometry::VERTEX_STRIDE;
use super::layout::TileTexture;
use crate::coord::GeoPoint;
use crate::stats::FetchStatsSnapshot;
use crate::view::ViewData;

/// One finished regeneration: mesh plus composited pixels.
#[derive(Clone, PartialEq)]
pub struct MapTexture {
    /// Tile layout the pixels and UVs follow
    pub layout: TileTexture,
    /// `x, y, u, v` per vertex, three vertices per triangle
    pub vertices: Vec<f32>,
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major, `width * height * 4` bytes
    pub pixels: Vec<u8>,
    pub zoom: i32,
    /// Projection center the mesh was computed for
    pub center: GeoPoint,
    /// Fetch statistics of the batch behind the pixels
    pub stats: FetchStatsSnapshot,
}

impl MapTexture {
    /// Published when nothing is visible.
    pub fn empty(zoom: i32, center: GeoPoint) -> Self {
        Self {
            layout: TileTexture::default(),
            vertices: Vec::new(),
            width: 0,
            height: 0,
            pixels: Vec::new(),
            zoom,
            center,
            stats: FetchStatsSnapshot::default(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }
}

impl fmt::Debug for MapTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapTexture")
            .field("tiles", &self.layout.tile_count())
            .field("filled", &self.layout.tile_filled())
            .field("vertices", &self.vertex_count())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("zoom", &self.zoom)
            .field("center", &self.center)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Receiver of generator output. Called on the generator thread.
pub trait MapSink: Send + Sync {
    /// `false` when a regeneration starts, `true` once its map is published.
    fn map_ready(&self, ready: bool);

    fn map_updated(&self, map: MapTexture);
}

/// Pull side of the viewport: the generator snapshots it on every
/// regeneration.
pub trait ViewProvider: Send + Sync {
    fn view_data(&self) -> ViewData;
}

impl<F> ViewProvider for F
where
    F: Fn() -> ViewData + Send + Sync,
{
    fn view_data(&self) -> ViewData {
        self()
    }
}
