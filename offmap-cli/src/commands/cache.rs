//! Cache management CLI commands.

use clap::Subcommand;
use offmap::service::ServiceError;

use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show entry counts of the current generation
    Info,
    /// Delete the current tile store
    Clear,
    /// Delete every store of every generation, tiles and assets alike
    ClearAll,
}

/// Run a cache subcommand.
pub fn run(options: &GlobalOptions, action: CacheAction) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("cache");
    let service = runner.create_service()?;

    match action {
        CacheAction::Info => {
            let info = service.cache_info()?;
            println!("Cache: {}", runner.config().cache.directory.display());
            println!("  Generation:    {}", info.generation);
            println!("  Tiles:         {}", info.tiles);
            println!("  Static assets: {}", info.static_assets);
            println!("  API responses: {}", info.dynamic);
            if !info.persistent {
                println!("  (not persistent)");
            }
        }
        CacheAction::Clear => {
            if service.clear_cache()? {
                println!("Tile cache cleared");
            } else {
                println!("Tile cache was already empty");
            }
        }
        CacheAction::ClearAll => {
            let cleared = service
                .lifecycle()
                .clear_all()
                .map_err(ServiceError::from)?;
            if cleared.is_empty() {
                println!("No stores to clear");
            } else {
                println!("Cleared {} stores:", cleared.len());
                for name in cleared {
                    println!("  {}", name);
                }
            }
        }
    }

    Ok(())
}
