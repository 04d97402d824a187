//! Wire globe: meridian and parallel lines drawn under the map.
//!
//! Nothing here is pushed to the [`MapSink`](crate::generator::MapSink);
//! the renderer pulls fresh segments through
//! [`Globe::wire_globe`](crate::globe::Globe::wire_globe) after each rotation.

use crate::projection::Projector;

/// Degrees between neighbouring meridians and between parallels.
pub const GRID_STEP_DEG: i32 = 10;

/// Degrees between traced points along one line.
pub const TRACE_STEP_DEG: i32 = 1;

/// Latitude limit of the grid.
pub const GRID_LAT_LIMIT: i32 = 80;

/// Floats per segment: `x1, y1, x2, y2`.
pub const SEGMENT_STRIDE: usize = 4;

/// Line segments of the visible graticule in GL units.
///
/// Meridians run from -80 to 80 latitude; parallels sit every 10 degrees
/// inside that band. A segment is dropped when either end is behind the
/// horizon.
pub fn compose_wire_globe(projector: &Projector, unit_in_meter: f64) -> Vec<f32> {
    let projector = projector.snapshot();
    let mut segments = Vec::new();

    let mut push_line = |points: &mut dyn Iterator<Item = (f64, f64)>| {
        let mut previous: Option<(f64, f64)> = None;
        for (lon, lat) in points {
            let current = projector.project_fwd(lon, lat);
            if let (Some((x1, y1)), Some((x2, y2))) = (previous, current) {
                segments.extend_from_slice(&[
                    (x1 * unit_in_meter) as f32,
                    (y1 * unit_in_meter) as f32,
                    (x2 * unit_in_meter) as f32,
                    (y2 * unit_in_meter) as f32,
                ]);
            }
            previous = current;
        }
    };

    for lon in (-180..180).step_by(GRID_STEP_DEG as usize) {
        let mut meridian = (-GRID_LAT_LIMIT..=GRID_LAT_LIMIT)
            .step_by(TRACE_STEP_DEG as usize)
            .map(|lat| (lon as f64, lat as f64));
        push_line(&mut meridian);
    }

    for lat in (-GRID_LAT_LIMIT..=GRID_LAT_LIMIT).step_by(GRID_STEP_DEG as usize) {
        let mut parallel = (-180..=180)
            .step_by(TRACE_STEP_DEG as usize)
            .map(|lon| (lon as f64, lat as f64));
        push_line(&mut parallel);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::EARTH_RADIUS;

    fn segment_count(segments: &[f32]) -> usize {
        segments.len() / SEGMENT_STRIDE
    }

    #[test]
    fn test_segments_stay_inside_disk() {
        let projector = Projector::new();
        let segments = compose_wire_globe(&projector, 0.001);
        assert!(segment_count(&segments) > 0);
        let limit = (EARTH_RADIUS * 0.001) as f32 * 1.0001;
        for value in &segments {
            assert!(value.abs() <= limit);
        }
    }

    #[test]
    fn test_only_front_hemisphere_is_drawn() {
        let projector = Projector::new();
        let segments = compose_wire_globe(&projector, 1.0);

        // Segment counts if both hemispheres were drawn
        let full_meridians = 36 * 160;
        let full_parallels = 17 * 360;
        let count = segment_count(&segments);
        assert!(count < full_meridians + full_parallels);
        assert!(count >= (full_meridians + full_parallels) / 3);
    }

    #[test]
    fn test_rotation_changes_geometry() {
        let projector = Projector::new();
        let before = compose_wire_globe(&projector, 1.0);
        projector.set_projection_at(45.0, 30.0);
        let after = compose_wire_globe(&projector, 1.0);
        assert_ne!(before, after);
    }
}
