//! Arguments shared by the view-based commands.

use clap::Args;
use globemap::projection::Projector;
use globemap::view::{ViewData, DEFAULT_METER_IN_PIXEL, DEFAULT_UNIT_IN_METER};

/// Where the globe is looked at from and how large the viewport is.
#[derive(Debug, Clone, Args)]
pub struct ViewArgs {
    /// Longitude of the projection center in decimal degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub lon: f64,

    /// Latitude of the projection center in decimal degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub lat: f64,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 768)]
    pub height: u32,

    /// Projected meters per screen pixel (smaller zooms in)
    #[arg(long, default_value_t = DEFAULT_METER_IN_PIXEL)]
    pub meter_in_pixel: f64,
}

impl ViewArgs {
    pub fn view_data(&self) -> ViewData {
        ViewData::from_viewport(
            self.width,
            self.height,
            self.meter_in_pixel,
            DEFAULT_UNIT_IN_METER,
        )
    }

    pub fn projector(&self) -> Projector {
        let projector = Projector::new();
        projector.set_projection_at(self.lon, self.lat);
        projector
    }
}
