//! Visibility probe: find one geographic point that is on screen.

use crate::coord::{GeoPoint, LAT_LIMIT};
use crate::projection::Projector;
use crate::view::ViewData;

/// Picks a point guaranteed to be visible, or `None` if nothing is.
///
/// - View box disjoint from the projected disk: nothing visible.
/// - View box strictly containing the disk: the projection center is
///   visible (latitude clamped to ±[`LAT_LIMIT`]).
/// - Otherwise the four view edges are sampled every `stride_px` pixels
///   until a sample inverse-projects.
pub fn visible_point(projector: &Projector, view: &ViewData, stride_px: u32) -> Option<GeoPoint> {
    let unit_limit = projector.radius() * view.unit_in_meter;

    if unit_limit <= view.gl_x0
        || view.gl_x1 <= -unit_limit
        || unit_limit <= view.gl_y0
        || view.gl_y1 <= -unit_limit
    {
        return None;
    }

    if view.gl_x0 < -unit_limit
        && unit_limit < view.gl_x1
        && view.gl_y0 < -unit_limit
        && unit_limit < view.gl_y1
    {
        let center = projector.projection_center();
        return Some(GeoPoint::new(
            center.lon,
            center.lat.clamp(-LAT_LIMIT, LAT_LIMIT),
        ));
    }

    let stride_px = stride_px.max(1);
    let meter_step = stride_px as f64 * view.meter_in_pixel;
    let x_num = view.pix_width / stride_px;
    let y_num = view.pix_height / stride_px;
    let (x0, x1, y0, y1) = view.bbox_meters();

    let probe = |x: f64, y: f64| {
        projector
            .project_inv(x, y)
            .map(|(lon, lat)| GeoPoint::new(lon, lat))
    };

    for i in 0..x_num {
        let x = x0 + i as f64 * meter_step;
        if let Some(point) = probe(x, y0).or_else(|| probe(x, y1)) {
            return Some(point);
        }
    }

    for i in 0..y_num {
        let y = y0 + i as f64 * meter_step;
        if let Some(point) = probe(x0, y).or_else(|| probe(x1, y)) {
            return Some(point);
        }
    }

    None
}
