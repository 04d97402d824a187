//! Map generator configuration.

use super::defaults::{DEFAULT_EDGE_STRIDE_PX, DEFAULT_MAX_TILES, DEFAULT_SUBDIVISIONS};

/// Tuning for map regeneration.
///
/// # Example
///
/// ```
/// use globemap::config::GeneratorConfig;
///
/// let config = GeneratorConfig::new().with_subdivisions(4);
/// assert_eq!(config.subdivisions(), 4);
/// assert_eq!(config.edge_stride_px(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    subdivisions: u32,
    edge_stride_px: u32,
    max_tiles: usize,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sub-quads per tile edge (minimum 1).
    pub fn with_subdivisions(mut self, k: u32) -> Self {
        self.subdivisions = k.max(1);
        self
    }

    /// Edge probe stride in pixels (minimum 1).
    pub fn with_edge_stride_px(mut self, stride: u32) -> Self {
        self.edge_stride_px = stride.max(1);
        self
    }

    /// Tile cap for one regeneration (minimum 1).
    pub fn with_max_tiles(mut self, max_tiles: usize) -> Self {
        self.max_tiles = max_tiles.max(1);
        self
    }

    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    pub fn edge_stride_px(&self) -> u32 {
        self.edge_stride_px
    }

    pub fn max_tiles(&self) -> usize {
        self.max_tiles
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            subdivisions: DEFAULT_SUBDIVISIONS,
            edge_stride_px: DEFAULT_EDGE_STRIDE_PX,
            max_tiles: DEFAULT_MAX_TILES,
        }
    }
}
