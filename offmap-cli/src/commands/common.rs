//! Arguments and output helpers shared across CLI commands.

use clap::Args;
use offmap::coord::BoundingBox;
use offmap::fetcher::JobReport;
use std::io::Write;

use crate::error::CliError;

/// Geographic area given by its four edges.
#[derive(Debug, Clone, Args)]
pub struct AreaArgs {
    /// Northern edge latitude
    #[arg(long, allow_negative_numbers = true)]
    pub north: f64,

    /// Southern edge latitude
    #[arg(long, allow_negative_numbers = true)]
    pub south: f64,

    /// Eastern edge longitude (may be smaller than --west across the antimeridian)
    #[arg(long, allow_negative_numbers = true)]
    pub east: f64,

    /// Western edge longitude
    #[arg(long, allow_negative_numbers = true)]
    pub west: f64,
}

impl AreaArgs {
    pub fn bounding_box(&self) -> Result<BoundingBox, CliError> {
        Ok(BoundingBox::new(self.north, self.south, self.east, self.west)?)
    }
}

/// Inclusive zoom range.
#[derive(Debug, Clone, Args)]
pub struct ZoomArgs {
    /// Lowest zoom level to include
    #[arg(long, default_value_t = 12)]
    pub min_zoom: u8,

    /// Highest zoom level to include
    #[arg(long, default_value_t = 16)]
    pub max_zoom: u8,
}

/// Progress callback that redraws a single status line.
pub fn progress_printer() -> impl FnMut(usize, usize) + Send {
    |done, total| {
        print!("\r  Downloaded {}/{} tiles", done, total);
        let _ = std::io::stdout().flush();
        if done == total {
            println!();
        }
    }
}

/// Print the summary of a finished download job.
pub fn print_report(report: &JobReport) {
    println!();
    println!("Download {}", if report.cancelled { "cancelled" } else { "complete" });
    println!("  Tiles:     {}", report.total);
    println!("  Attempted: {}", report.attempted);
    println!("  Cached:    {}", report.persisted);
    if report.failed > 0 {
        println!("  Failed:    {}", report.failed);
    }
}
