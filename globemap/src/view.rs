//! Viewport snapshot consumed by map regeneration.
//!
//! A [`ViewData`] is copied at the moment a regeneration starts so an
//! in-flight computation never observes the viewport changing under it.
//! Bounding boxes are stored in GL units; `unit_in_meter` converts meters
//! to GL units and `meter_in_pixel` relates meters to screen pixels.

use crate::coord::{zoom_level, TILE_SIDE};

/// GL units per projected meter unless the viewport says otherwise.
pub const DEFAULT_UNIT_IN_METER: f64 = 0.001;

/// Projected meters per screen pixel unless the viewport says otherwise.
pub const DEFAULT_METER_IN_PIXEL: f64 = 1000.0;

/// Immutable snapshot of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewData {
    /// GL units per meter
    pub unit_in_meter: f64,
    /// Meters per pixel
    pub meter_in_pixel: f64,
    /// Slippy-map zoom level derived from `meter_in_pixel`
    pub zoom: i32,
    /// Bounding box, GL units
    pub gl_x0: f64,
    pub gl_x1: f64,
    pub gl_y0: f64,
    pub gl_y1: f64,
    /// Viewport size in pixels
    pub pix_width: u32,
    pub pix_height: u32,
}

impl Default for ViewData {
    fn default() -> Self {
        Self::from_viewport(1024, 768, DEFAULT_METER_IN_PIXEL, DEFAULT_UNIT_IN_METER)
    }
}

impl ViewData {
    /// Builds a snapshot for a viewport centered on the projection origin.
    pub fn from_viewport(
        pix_width: u32,
        pix_height: u32,
        meter_in_pixel: f64,
        unit_in_meter: f64,
    ) -> Self {
        let half_w = pix_width as f64 * meter_in_pixel * unit_in_meter / 2.0;
        let half_h = pix_height as f64 * meter_in_pixel * unit_in_meter / 2.0;
        Self {
            unit_in_meter,
            meter_in_pixel,
            zoom: zoom_level(meter_in_pixel, TILE_SIDE),
            gl_x0: -half_w,
            gl_x1: half_w,
            gl_y0: -half_h,
            gl_y1: half_h,
            pix_width,
            pix_height,
        }
    }

    /// Returns a copy with the bounding box shifted by `(dx, dy)` GL units.
    pub fn panned(mut self, dx: f64, dy: f64) -> Self {
        self.gl_x0 += dx;
        self.gl_x1 += dx;
        self.gl_y0 += dy;
        self.gl_y1 += dy;
        self
    }

    /// Bounding box in projected meters as `(x0, x1, y0, y1)`.
    pub fn bbox_meters(&self) -> (f64, f64, f64, f64) {
        let k = self.unit_in_meter;
        (self.gl_x0 / k, self.gl_x1 / k, self.gl_y0 / k, self.gl_y1 / k)
    }

    /// Whether a projected point (meters) falls inside the bounding box.
    pub fn contains_meters(&self, x: f64, y: f64) -> bool {
        let gx = x * self.unit_in_meter;
        let gy = y * self.unit_in_meter;
        gx >= self.gl_x0 && gx <= self.gl_x1 && gy >= self.gl_y0 && gy <= self.gl_y1
    }

    /// Whether the viewport has a usable, non-degenerate size.
    pub fn is_empty(&self) -> bool {
        self.pix_width == 0
            || self.pix_height == 0
            || self.gl_x1 <= self.gl_x0
            || self.gl_y1 <= self.gl_y0
            || self.unit_in_meter <= 0.0
    }
}
