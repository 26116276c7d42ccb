//! Describe the tile containing a point.

use clap::Args;
use offmap::config::ConfigFile;
use offmap::coord::{tile_for, tile_to_lat_lon, TileUrlTemplate};

use crate::error::CliError;
use crate::runner::GlobalOptions;

#[derive(Debug, Args)]
pub struct TileArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Zoom level (0-22)
    #[arg(long, default_value_t = 15)]
    pub zoom: u8,
}

/// Print the tile address, its north-west corner and its URL.
pub fn run(options: &GlobalOptions, args: TileArgs) -> Result<(), CliError> {
    let config = ConfigFile::load_from(&options.config_path())?;
    let template = TileUrlTemplate::parse(config.provider.tile_url_template.as_str())?;

    let tile = tile_for(args.lat, args.lon, args.zoom)?;
    let (lat, lon) = tile_to_lat_lon(&tile);

    println!("Tile:      {}", tile);
    println!("NW corner: {:.6}, {:.6}", lat, lon);
    println!("URL:       {}", template.url_for(&tile));
    Ok(())
}
