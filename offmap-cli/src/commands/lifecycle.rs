//! Install and recache commands.

use offmap::lifecycle::{FacilityResult, PrewarmReport, StartupReport};
use offmap::service::ServiceError;

use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Install the current generation if needed, then activate it.
pub fn run_install(options: &GlobalOptions) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("install");
    let service = runner.create_service()?;

    let names = service.lifecycle().names().clone();
    println!("Generation: {}", names.generation());

    let report = runner
        .block_on(service.lifecycle().startup())
        .map_err(ServiceError::from)?;

    match report {
        StartupReport::WarmStart => {
            println!("Already installed, nothing to do");
        }
        StartupReport::Activated { purged } => {
            println!("Activated previously installed generation");
            for name in purged {
                println!("  Purged {}", name);
            }
        }
        StartupReport::Installed { install, purged } => {
            println!("Installed");
            println!("  Assets cached: {}", install.assets_cached);
            for url in &install.assets_failed {
                println!("  Asset failed:  {}", url);
            }
            print_prewarm(&install.prewarm);
            for name in purged {
                println!("  Purged {}", name);
            }
        }
    }

    println!("State: {}", service.lifecycle().state());
    Ok(())
}

/// Re-download the tiles around every point of interest.
pub fn run_recache(options: &GlobalOptions) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("recache");
    let service = runner.create_service()?;

    let report = runner
        .block_on(service.lifecycle().recache())
        .map_err(ServiceError::from)?;
    print_prewarm(&report);
    Ok(())
}

fn print_prewarm(report: &PrewarmReport) {
    for facility in &report.facilities {
        match &facility.result {
            FacilityResult::Completed(job) => println!(
                "  {}: {}/{} tiles cached",
                facility.name, job.persisted, job.total
            ),
            FacilityResult::Skipped(reason) => {
                println!("  {}: skipped ({})", facility.name, reason)
            }
        }
    }
    println!(
        "  Pre-warm: {} tiles cached, {} failed",
        report.tiles_persisted(),
        report.tiles_failed()
    );
}
