//! Orthographic projection of the globe.
//!
//! The [`Projector`] converts between geographic degrees and projected
//! meters on a plane tangent to the sphere at a movable center point.
//! Only the hemisphere facing the viewer is representable: points on the
//! far side forward-project to `None`, and plane points outside the disk of
//! radius [`EARTH_RADIUS`] inverse-project to `None`. Callers treat `None`
//! as "not visible", never as a failure.
//!
//! Every call takes the center lock once and releases it before returning.
//! A caller that needs a projected point together with the center it was
//! computed for must snapshot [`Projector::projection_center`] first.

use parking_lot::Mutex;

use crate::coord::{normalize_lon, GeoPoint, EARTH_RADIUS};

/// Points whose angular distance from the center has a cosine below this
/// are behind the horizon.
const HORIZON_EPSILON: f64 = -1e-10;

/// Thread-safe spherical orthographic projector.
#[derive(Debug)]
pub struct Projector {
    center: Mutex<GeoPoint>,
    radius: f64,
}

impl Default for Projector {
    fn default() -> Self {
        Self::new()
    }
}

impl Projector {
    /// Creates a projector centered on (0, 0) with the standard planet radius.
    pub fn new() -> Self {
        Self::with_radius(EARTH_RADIUS)
    }

    /// Creates a projector for a sphere of the given radius in meters.
    pub fn with_radius(radius: f64) -> Self {
        Self {
            center: Mutex::new(GeoPoint::default()),
            radius,
        }
    }

    /// Sphere radius in meters.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Re-centers the projection.
    ///
    /// Longitude is normalized into `[-180, 180)`, latitude clamped to ±90.
    pub fn set_projection_at(&self, lon: f64, lat: f64) {
        let mut center = self.center.lock();
        *center = GeoPoint::new(normalize_lon(lon), lat.clamp(-90.0, 90.0));
    }

    /// Current projection center.
    pub fn projection_center(&self) -> GeoPoint {
        *self.center.lock()
    }

    /// Detached copy frozen at the current center.
    ///
    /// Map regeneration projects thousands of points; working on a snapshot
    /// keeps them consistent while the shared projector keeps rotating.
    pub fn snapshot(&self) -> Projector {
        Projector {
            center: Mutex::new(self.projection_center()),
            radius: self.radius,
        }
    }

    /// Projects geographic degrees to plane meters.
    ///
    /// Returns `None` when the point lies on the far hemisphere.
    pub fn project_fwd(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let center = *self.center.lock();
        forward(center, self.radius, lon, lat)
    }

    /// Projects plane meters back to geographic degrees.
    ///
    /// Returns `None` when the point lies outside the projected disk.
    pub fn project_inv(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let center = *self.center.lock();
        inverse(center, self.radius, x, y)
    }
}

fn forward(center: GeoPoint, radius: f64, lon: f64, lat: f64) -> Option<(f64, f64)> {
    let (sin_phi0, cos_phi0) = center.lat.to_radians().sin_cos();
    let (sin_phi, cos_phi) = lat.to_radians().sin_cos();
    let (sin_dl, cos_dl) = (lon - center.lon).to_radians().sin_cos();

    let cos_c = sin_phi0 * sin_phi + cos_phi0 * cos_phi * cos_dl;
    if cos_c < HORIZON_EPSILON {
        return None;
    }

    let x = radius * cos_phi * sin_dl;
    let y = radius * (cos_phi0 * sin_phi - sin_phi0 * cos_phi * cos_dl);
    Some((x, y))
}

fn inverse(center: GeoPoint, radius: f64, x: f64, y: f64) -> Option<(f64, f64)> {
    let rho = x.hypot(y);
    if rho > radius {
        return None;
    }
    if rho == 0.0 {
        return Some((center.lon, center.lat));
    }

    let (sin_phi0, cos_phi0) = center.lat.to_radians().sin_cos();
    let c = (rho / radius).asin();
    let (sin_c, cos_c) = c.sin_cos();

    let lat = (cos_c * sin_phi0 + y * sin_c * cos_phi0 / rho)
        .clamp(-1.0, 1.0)
        .asin();
    let dl = (x * sin_c).atan2(rho * cos_c * cos_phi0 - y * sin_c * sin_phi0);

    Some((normalize_lon(center.lon + dl.to_degrees()), lat.to_degrees()))
}
