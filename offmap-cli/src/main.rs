//! offmap command-line shell.
//!
//! Downloads map areas for offline use, manages the cache generations and
//! routes individual requests through the cache.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::common::{AreaArgs, ZoomArgs};
use commands::config::ConfigCommands;
use commands::download::AroundArgs;
use commands::fetch::FetchArgs;
use commands::tile::TileArgs;
use error::CliError;
use runner::GlobalOptions;

#[derive(Parser)]
#[command(name = "offmap")]
#[command(version = offmap::VERSION)]
#[command(about = "Offline map tile cache", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count the tiles an area download would fetch
    Estimate {
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        zoom: ZoomArgs,
    },
    /// Download every tile covering an area
    Download {
        #[command(flatten)]
        area: AreaArgs,
        #[command(flatten)]
        zoom: ZoomArgs,
    },
    /// Download the tiles within a radius of a point
    Around(AroundArgs),
    /// Show the tile containing a point
    Tile(TileArgs),
    /// Inspect or clear the cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Install the current cache generation and purge older ones
    Install,
    /// Re-download the tiles around the points of interest
    Recache,
    /// Route one request through the cache
    Fetch(FetchArgs),
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let options = cli.options;
    match cli.command {
        Commands::Estimate { area, zoom } => commands::estimate::run(area, zoom),
        Commands::Download { area, zoom } => commands::download::run(&options, area, zoom),
        Commands::Around(args) => commands::download::run_around(&options, args),
        Commands::Tile(args) => commands::tile::run(&options, args),
        Commands::Cache { action } => commands::cache::run(&options, action),
        Commands::Install => commands::lifecycle::run_install(&options),
        Commands::Recache => commands::lifecycle::run_recache(&options),
        Commands::Fetch(args) => commands::fetch::run(&options, args),
        Commands::Config { command } => commands::config::run(&options, command),
    }
}
