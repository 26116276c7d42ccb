//! Tile count estimate for an area.

use offmap::coord::{tile_count, zoom_range};

use super::common::{AreaArgs, ZoomArgs};
use crate::error::CliError;

/// Print how many tiles an area download would fetch. Needs no network.
pub fn run(area: AreaArgs, zoom: ZoomArgs) -> Result<(), CliError> {
    let bbox = area.bounding_box()?;
    let zooms = zoom_range(zoom.min_zoom, zoom.max_zoom)?;

    println!("Area: {}", bbox);
    for z in &zooms {
        println!("  z{:<2} {:>10} tiles", z, tile_count(&bbox, &[*z])?);
    }
    println!("Total: {} tiles", tile_count(&bbox, &zooms)?);
    Ok(())
}
