//! globemap CLI - Command-line interface
//!
//! Renders globe map textures headlessly and manages the config file.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigAction;
use commands::render::RenderArgs;
use commands::visible::VisibleArgs;

#[derive(Parser)]
#[command(name = "globemap")]
#[command(version = globemap::VERSION)]
#[command(about = "Map tiles on an orthographic globe", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the visible tiles and write the composited texture to a PNG
    Render(RenderArgs),

    /// List the tiles visible for a view without fetching anything
    Visible(VisibleArgs),

    /// Manage ~/.globemap/config.ini
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Visible(args) => commands::visible::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        e.exit();
    }
}
