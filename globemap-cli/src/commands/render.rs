//! `globemap render`: one headless regeneration written to a PNG.

use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use globemap::generator::{MapSink, MapTexture};
use globemap::globe::GlobeBuilder;
use globemap::provider::TileServerKind;
use image::RgbaImage;
use tracing::info;

use super::common::ViewArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Tile server (osm, 2gis); defaults to the config file setting
    #[arg(long)]
    pub server: Option<TileServerKind>,

    /// Output PNG path
    #[arg(long, default_value = "map.png")]
    pub output: PathBuf,

    /// Seconds to wait for the map
    #[arg(long, default_value_t = 120)]
    pub timeout: u64,
}

/// Forwards published maps to the command thread.
struct ChannelSink(Sender<MapTexture>);

impl MapSink for ChannelSink {
    fn map_ready(&self, _ready: bool) {}

    fn map_updated(&self, map: MapTexture) {
        let _ = self.0.send(map);
    }
}

pub fn run(args: RenderArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    let config = runner.config();
    let kind = args.server.unwrap_or(config.server.kind);

    let (tx, rx) = mpsc::channel();
    let globe = GlobeBuilder::from_config(config)?
        .with_tile_server(kind)
        .with_projector(Arc::new(args.view.projector()))
        .with_view(args.view.view_data())
        .with_map_sink(Arc::new(ChannelSink(tx)))
        .build()?;

    info!(
        lon = args.view.lon,
        lat = args.view.lat,
        server = %kind,
        "Rendering"
    );
    globe.view_updated();

    let map = rx.recv_timeout(Duration::from_secs(args.timeout));
    globe.shutdown();
    let map = map.map_err(|_| CliError::RenderTimeout { secs: args.timeout })?;

    if map.is_empty() {
        println!("Nothing visible; no image written");
        return Ok(());
    }

    let (width, height) = (map.width, map.height);
    let vertex_count = map.vertex_count();
    let image = RgbaImage::from_raw(width, height, map.pixels).ok_or_else(|| {
        CliError::FileWrite {
            path: args.output.clone(),
            error: "pixel buffer does not match texture size".to_string(),
        }
    })?;
    image.save(&args.output).map_err(|e| CliError::FileWrite {
        path: args.output.clone(),
        error: e.to_string(),
    })?;

    let (cols, rows) = map.layout.texture_size();
    println!("Wrote {} ({}x{} px)", args.output.display(), width, height);
    println!(
        "  Tiles:    {} of {} filled ({}x{} grid, zoom {})",
        map.layout.tile_filled(),
        map.layout.tile_count(),
        cols,
        rows,
        map.zoom
    );
    println!("  Vertices: {}", vertex_count);
    println!("  Fetch:    {}", map.stats);
    for (mirror, count) in &map.stats.mirror_usage {
        println!("    {:<28} {}", mirror, count);
    }

    Ok(())
}
