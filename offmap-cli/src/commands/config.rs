//! Configuration file commands.

use clap::Subcommand;
use offmap::config::ConfigFile;

use crate::error::CliError;
use crate::runner::GlobalOptions;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file path
    Path,
    /// Print the effective configuration
    Show,
}

pub fn run(options: &GlobalOptions, command: ConfigCommands) -> Result<(), CliError> {
    let path = options.config_path();

    match command {
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                println!("Config file already exists: {}", path.display());
                println!("Use --force to overwrite it with defaults.");
                return Ok(());
            }
            ConfigFile::default().save_to(&path)?;
            println!("Wrote {}", path.display());
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Show => {
            let config = ConfigFile::load_from(&path)?;
            println!("# {}", path.display());
            print!("{}", config);
        }
    }

    Ok(())
}
