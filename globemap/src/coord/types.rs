//! Coordinate type definitions

use std::fmt;

/// Planet radius in meters used by every projection and zoom computation.
pub const EARTH_RADIUS: f64 = 6_378_140.0;

/// Side of one square map tile in pixels.
pub const TILE_SIDE: u32 = 256;

/// Latitude clamp that keeps Web Mercator math away from the poles.
pub const LAT_LIMIT: f64 = 85.0;

/// Zoom levels served by the supported tile servers
pub const MIN_ZOOM: i32 = 0;
pub const MAX_ZOOM: i32 = 19;

/// Integer key of one slippy-map tile.
///
/// Two heads are equal iff zoom, column and row all match, which makes
/// the type usable as a cache and layout key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileHead {
    /// Zoom level
    pub z: i32,
    /// Column (east-west), 0 at the antimeridian going east
    pub x: i32,
    /// Row (north-south), 0 at the north
    pub y: i32,
}

impl TileHead {
    #[inline]
    pub fn new(z: i32, x: i32, y: i32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along one axis at this head's zoom level.
    #[inline]
    pub fn tiles_per_axis(&self) -> i32 {
        tiles_per_axis(self.z)
    }

    /// Whether the column and row lie inside the grid for this zoom.
    pub fn is_valid(&self) -> bool {
        let n = self.tiles_per_axis();
        (MIN_ZOOM..=MAX_ZOOM).contains(&self.z)
            && (0..n).contains(&self.x)
            && (0..n).contains(&self.y)
    }

    /// Geographic bounds of this tile.
    pub fn bounds(&self) -> TileBounds {
        TileBounds {
            lon0: super::tile_x_to_lon(self.x as f64, self.z),
            lat0: super::tile_y_to_lat((self.y + 1) as f64, self.z),
            lon1: super::tile_x_to_lon((self.x + 1) as f64, self.z),
            lat1: super::tile_y_to_lat(self.y as f64, self.z),
        }
    }
}

impl fmt::Display for TileHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Number of tiles along one axis at zoom `z`.
#[inline]
pub fn tiles_per_axis(z: i32) -> i32 {
    1 << z.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Geographic corners of a tile: `(lon0, lat0)` is the south-west corner,
/// `(lon1, lat1)` the north-east one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub lon0: f64,
    pub lat0: f64,
    pub lon1: f64,
    pub lat1: f64,
}

impl TileBounds {
    /// Corners in the order south-west, south-east, north-east, north-west.
    pub fn corners(&self) -> [GeoPoint; 4] {
        [
            GeoPoint::new(self.lon0, self.lat0),
            GeoPoint::new(self.lon1, self.lat0),
            GeoPoint::new(self.lon1, self.lat1),
            GeoPoint::new(self.lon0, self.lat1),
        ]
    }
}

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}
