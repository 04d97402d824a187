//! Coordinate conversion module
//!
//! Conversions between geographic coordinates (longitude/latitude in degrees)
//! and Web Mercator tile coordinates, plus the zoom level formula that maps a
//! viewport scale onto the tile pyramid.
//!
//! Fractional tile coordinates are used throughout so that callers can
//! address points inside a tile (for mesh subdivision) as well as tile
//! corners.

mod types;

pub use types::{
    tiles_per_axis, GeoPoint, TileBounds, TileHead, EARTH_RADIUS, LAT_LIMIT, MAX_ZOOM, MIN_ZOOM,
    TILE_SIDE,
};

use std::f64::consts::PI;

/// Converts a longitude to a fractional tile column at zoom `z`.
#[inline]
pub fn lon_to_tile_x(lon: f64, z: i32) -> f64 {
    (lon + 180.0) / 360.0 * tiles_per_axis(z) as f64
}

/// Converts a latitude to a fractional tile row at zoom `z`.
///
/// The latitude is clamped to [`LAT_LIMIT`] first.
#[inline]
pub fn lat_to_tile_y(lat: f64, z: i32) -> f64 {
    let lat_rad = lat.clamp(-LAT_LIMIT, LAT_LIMIT).to_radians();
    (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * tiles_per_axis(z) as f64
}

/// Converts a fractional tile column back to a longitude.
#[inline]
pub fn tile_x_to_lon(x: f64, z: i32) -> f64 {
    x / tiles_per_axis(z) as f64 * 360.0 - 180.0
}

/// Converts a fractional tile row back to a latitude (inverse Web Mercator).
#[inline]
pub fn tile_y_to_lat(y: f64, z: i32) -> f64 {
    let n = tiles_per_axis(z) as f64;
    (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees()
}

/// Returns the tile containing the given point at zoom `z`.
///
/// Longitude is normalized first; latitude is clamped to [`LAT_LIMIT`].
/// The result is always a valid head for `z`.
pub fn tile_at(lon: f64, lat: f64, z: i32) -> TileHead {
    let z = z.clamp(MIN_ZOOM, MAX_ZOOM);
    let max = tiles_per_axis(z) - 1;
    let x = lon_to_tile_x(normalize_lon(lon), z).floor() as i32;
    let y = lat_to_tile_y(lat, z).floor() as i32;
    TileHead::new(z, x.clamp(0, max), y.clamp(0, max))
}

/// Wraps a tile column into `[0, 2^z)`; longitude is cyclic.
#[inline]
pub fn wrap_tile_x(x: i32, z: i32) -> i32 {
    x.rem_euclid(tiles_per_axis(z))
}

/// Normalizes a longitude into `[-180, 180)`.
#[inline]
pub fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Zoom level for a viewport scale.
///
/// `zoom = round(log2(4 * R / (meter_in_pixel * tile_side)))`, clamped to
/// the supported zoom range. Non-increasing in `meter_in_pixel`.
pub fn zoom_level(meter_in_pixel: f64, tile_side: u32) -> i32 {
    if meter_in_pixel <= 0.0 || !meter_in_pixel.is_finite() {
        return MAX_ZOOM;
    }
    let raw = (EARTH_RADIUS * 4.0 / meter_in_pixel / tile_side as f64).log2();
    (raw.round() as i32).clamp(MIN_ZOOM, MAX_ZOOM)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_zoom_zero_is_single_tile() {
        assert_eq!(tile_at(0.0, 0.0, 0), TileHead::new(0, 0, 0));
        assert_eq!(tile_at(179.9, 84.0, 0), TileHead::new(0, 0, 0));
        assert_eq!(tile_at(-180.0, -84.0, 0), TileHead::new(0, 0, 0));
    }

    #[test]
    fn test_new_york_city_at_zoom_16() {
        let tile = tile_at(-74.0060, 40.7128, 16);
        assert_eq!(tile, TileHead::new(16, 19295, 24640));
    }

    #[test]
    fn test_tile_bounds_corners() {
        let bounds = TileHead::new(1, 1, 0).bounds();
        assert!(approx(bounds.lon0, 0.0));
        assert!(approx(bounds.lon1, 180.0));
        assert!(approx(bounds.lat0, 0.0));
        assert!(bounds.lat1 > 85.0 && bounds.lat1 < 85.1);
    }

    #[test]
    fn test_fractional_round_trip() {
        for z in [0, 3, 10, 17] {
            let lon = 37.6173;
            let lat = 55.7558;
            let x = lon_to_tile_x(lon, z);
            let y = lat_to_tile_y(lat, z);
            assert!(approx(tile_x_to_lon(x, z), lon));
            assert!(approx(tile_y_to_lat(y, z), lat));
        }
    }

    #[test]
    fn test_latitude_is_clamped() {
        let z = 4;
        assert_eq!(tile_at(0.0, 90.0, z).y, 0);
        assert_eq!(tile_at(0.0, -90.0, z).y, tiles_per_axis(z) - 1);
    }

    #[test]
    fn test_wrap_tile_x() {
        assert_eq!(wrap_tile_x(-1, 3), 7);
        assert_eq!(wrap_tile_x(8, 3), 0);
        assert_eq!(wrap_tile_x(5, 3), 5);
        assert_eq!(wrap_tile_x(0, 0), 0);
        assert_eq!(wrap_tile_x(1, 0), 0);
    }

    #[test]
    fn test_normalize_lon() {
        assert!(approx(normalize_lon(180.0), -180.0));
        assert!(approx(normalize_lon(190.0), -170.0));
        assert!(approx(normalize_lon(-190.0), 170.0));
        assert!(approx(normalize_lon(45.0), 45.0));
    }

    #[test]
    fn test_zoom_level_values() {
        // Whole planet in 1024 px: 4R/256 meters per pixel gives zoom 0
        assert_eq!(zoom_level(EARTH_RADIUS * 4.0 / 256.0, TILE_SIDE), 0);
        assert_eq!(zoom_level(EARTH_RADIUS * 4.0 / 256.0 / 8.0, TILE_SIDE), 3);
        assert_eq!(zoom_level(1e12, TILE_SIDE), MIN_ZOOM);
        assert_eq!(zoom_level(1e-6, TILE_SIDE), MAX_ZOOM);
    }

    #[test]
    fn test_zoom_level_is_non_increasing() {
        let mut previous = i32::MAX;
        let mut mpp = 0.01;
        while mpp < 1e8 {
            let zoom = zoom_level(mpp, TILE_SIDE);
            assert!(zoom <= previous, "zoom rose at {} m/px", mpp);
            previous = zoom;
            mpp *= 1.3;
        }
    }

    #[test]
    fn test_head_validity_and_display() {
        assert!(TileHead::new(2, 3, 3).is_valid());
        assert!(!TileHead::new(2, 4, 0).is_valid());
        assert!(!TileHead::new(2, 0, -1).is_valid());
        assert_eq!(TileHead::new(5, 10, 12).to_string(), "5/10/12");
    }
}
