//! Area downloads: by bounding box or around a point.

use clap::Args;
use offmap::coord::{bounding_box_around, tile_count, zoom_range, BoundingBox};

use super::common::{print_report, progress_printer, AreaArgs, ZoomArgs};
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the `around` command.
#[derive(Debug, Args)]
pub struct AroundArgs {
    /// Centre latitude
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Centre longitude
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Radius around the centre in kilometres
    #[arg(long, default_value_t = 2.0)]
    pub radius_km: f64,

    #[command(flatten)]
    pub zoom: ZoomArgs,

    /// Only print the area and tile count
    #[arg(long)]
    pub dry_run: bool,
}

/// Download every tile covering a bounding box.
pub fn run(options: &GlobalOptions, area: AreaArgs, zoom: ZoomArgs) -> Result<(), CliError> {
    let bbox = area.bounding_box()?;
    download(options, &bbox, &zoom)
}

/// Download the tiles within a radius of a point.
pub fn run_around(options: &GlobalOptions, args: AroundArgs) -> Result<(), CliError> {
    let bbox = bounding_box_around(args.lat, args.lon, args.radius_km)?;

    if args.dry_run {
        let zooms = zoom_range(args.zoom.min_zoom, args.zoom.max_zoom)?;
        println!("Area: {}", bbox);
        println!("Tiles: {}", tile_count(&bbox, &zooms)?);
        return Ok(());
    }

    download(options, &bbox, &args.zoom)
}

fn download(options: &GlobalOptions, bbox: &BoundingBox, zoom: &ZoomArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("download");
    let service = runner.create_service()?;

    let total = service.estimate_tile_count(bbox, zoom.min_zoom, zoom.max_zoom)?;
    println!("Area: {}", bbox);
    println!(
        "Downloading {} tiles (zoom {}-{}, {} at a time)",
        total,
        zoom.min_zoom,
        zoom.max_zoom,
        service.config().fetch().concurrency
    );

    let report = runner.block_on(service.download_area(
        bbox,
        zoom.min_zoom,
        zoom.max_zoom,
        progress_printer(),
    ))?;

    print_report(&report);
    Ok(())
}
