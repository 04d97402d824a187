//! Texture layout: where each tile sits inside the composited texture.

use std::collections::{HashMap, HashSet};

use crate::coord::TileHead;

/// Geographic corners of one tile and its cell in the composited texture.
///
/// `(lon0, lat0)` is the south-west corner and `(lon1, lat1)` the north-east
/// one. Texture rows grow southwards: `ty1` (north edge) is smaller than
/// `ty0` (south edge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBody {
    pub lon0: f64,
    pub lat0: f64,
    pub lon1: f64,
    pub lat1: f64,
    pub tx0: f32,
    pub ty0: f32,
    pub tx1: f32,
    pub ty1: f32,
    pub row: u32,
    pub col: u32,
}

/// Layout of one composited texture. Holds no pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileTexture {
    cols: u32,
    rows: u32,
    tile_filled: usize,
    order: Vec<TileHead>,
    tiles: HashMap<TileHead, TileBody>,
}

impl TileTexture {
    /// Lays tiles out row-major in the given order on a
    /// `ceil(sqrt(N))`-column grid. Repeated heads keep their first cell.
    pub fn layout(heads: &[TileHead]) -> Self {
        let mut seen = HashSet::with_capacity(heads.len());
        let order: Vec<TileHead> = heads
            .iter()
            .copied()
            .filter(|head| seen.insert(*head))
            .collect();

        let count = order.len() as u32;
        if count == 0 {
            return Self::default();
        }

        let cols = (count as f64).sqrt().ceil() as u32;
        let rows = count.div_ceil(cols);

        let tiles = order
            .iter()
            .enumerate()
            .map(|(i, head)| {
                let row = i as u32 / cols;
                let col = i as u32 % cols;
                let bounds = head.bounds();
                let body = TileBody {
                    lon0: bounds.lon0,
                    lat0: bounds.lat0,
                    lon1: bounds.lon1,
                    lat1: bounds.lat1,
                    tx0: col as f32 / cols as f32,
                    tx1: (col + 1) as f32 / cols as f32,
                    ty0: (row + 1) as f32 / rows as f32,
                    ty1: row as f32 / rows as f32,
                    row,
                    col,
                };
                (*head, body)
            })
            .collect();

        Self {
            cols,
            rows,
            tile_filled: 0,
            order,
            tiles,
        }
    }

    /// Grid size as `(cols, rows)`.
    pub fn texture_size(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Tiles that have received pixels.
    pub fn tile_filled(&self) -> usize {
        self.tile_filled
    }

    /// Records one more filled tile; never exceeds [`Self::tile_count`].
    pub fn mark_filled(&mut self) {
        self.tile_filled = (self.tile_filled + 1).min(self.tile_count());
    }

    /// Heads in layout order.
    pub fn heads(&self) -> &[TileHead] {
        &self.order
    }

    pub fn body(&self, head: &TileHead) -> Option<&TileBody> {
        self.tiles.get(head)
    }

    pub fn contains(&self, head: &TileHead) -> bool {
        self.tiles.contains_key(head)
    }

    /// Bodies in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&TileHead, &TileBody)> {
        self.order
            .iter()
            .filter_map(move |head| self.tiles.get(head).map(|body| (head, body)))
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
