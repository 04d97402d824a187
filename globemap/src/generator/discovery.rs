//! Tile-set discovery by flood fill over the tile grid.

use std::collections::{HashSet, VecDeque};

use tracing::trace;

use crate::coord::{tiles_per_axis, wrap_tile_x, TileHead};
use crate::projection::Projector;
use crate::view::ViewData;

/// Whether any corner of the tile forward-projects inside the view box.
pub fn tile_is_visible(projector: &Projector, view: &ViewData, head: &TileHead) -> bool {
    head.bounds().corners().iter().any(|corner| {
        projector
            .project_fwd(corner.lon, corner.lat)
            .is_some_and(|(x, y)| view.contains_meters(x, y))
    })
}

/// The four grid neighbours: columns wrap around, rows stop at the poles.
fn neighbours(head: TileHead) -> impl Iterator<Item = TileHead> {
    let n = tiles_per_axis(head.z);
    let z = head.z;
    [
        (wrap_tile_x(head.x - 1, z), head.y),
        (wrap_tile_x(head.x + 1, z), head.y),
        (head.x, head.y - 1),
        (head.x, head.y + 1),
    ]
    .into_iter()
    .filter(move |&(_, y)| (0..n).contains(&y))
    .map(move |(x, y)| TileHead::new(z, x, y))
}

/// Breadth-first discovery of the tiles around `seed`.
///
/// Every reached tile is part of the result, in discovery order, but only
/// visible ones (and the seed) are expanded further. Stops early once
/// `max_tiles` tiles have been found.
///
/// Visibility is judged by tile corners only. A view thinner than one tile
/// can cross a tile without containing any of its corners, so such views
/// may leave gaps beyond the first invisible ring.
pub fn discover_tiles(
    projector: &Projector,
    view: &ViewData,
    seed: TileHead,
    max_tiles: usize,
) -> Vec<TileHead> {
    let mut visited = HashSet::from([seed]);
    let mut found = vec![seed];
    let mut frontier = VecDeque::from([seed]);

    'fill: while let Some(tile) = frontier.pop_front() {
        for neighbour in neighbours(tile) {
            if found.len() >= max_tiles {
                trace!(max_tiles, "Tile cap reached");
                break 'fill;
            }
            if !visited.insert(neighbour) {
                continue;
            }
            found.push(neighbour);
            if tile_is_visible(projector, view, &neighbour) {
                frontier.push_back(neighbour);
            }
        }
    }

    found
}
