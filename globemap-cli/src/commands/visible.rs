//! `globemap visible`: which tiles a view needs.

use clap::Args;
use globemap::config::ConfigFile;
use globemap::generator::plan_layout;

use super::common::ViewArgs;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct VisibleArgs {
    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn run(args: VisibleArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let view = args.view.view_data();
    let projector = args.view.projector();

    println!(
        "View: {}x{} px at {} m/px, zoom {}",
        view.pix_width, view.pix_height, view.meter_in_pixel, view.zoom
    );
    println!("Center: {}, {}", args.view.lon, args.view.lat);

    let Some(layout) = plan_layout(&projector, &view, &config.generator_config()) else {
        println!("Nothing visible");
        return Ok(());
    };

    let (cols, rows) = layout.texture_size();
    println!(
        "{} tiles in a {}x{} texture grid",
        layout.tile_count(),
        cols,
        rows
    );
    println!();
    for (head, body) in layout.iter() {
        println!(
            "  {:<16} cell {},{}  lon {:.4}..{:.4}  lat {:.4}..{:.4}",
            head.to_string(),
            body.row,
            body.col,
            body.lon0,
            body.lon1,
            body.lat0,
            body.lat1
        );
    }

    Ok(())
}
