//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, service creation
//! and the async runtime so command handlers stay short.

use crate::error::CliError;
use clap::Args;
use std::future::Future;
use std::path::{Path, PathBuf};
use offmap::config::{config_file_path, ConfigFile};
use offmap::logging::{init_logging, LoggingGuard};
use offmap::provider::ReqwestClient;
use offmap::service::OfflineMapService;
use tracing::info;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct GlobalOptions {
    /// Config file to use instead of ~/.offmap/config.ini
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug-level logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Mirror log output to stdout
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl GlobalOptions {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    runtime: tokio::runtime::Runtime,
}

impl CliRunner {
    /// Load config, initialize logging and start the async runtime.
    pub fn new(options: &GlobalOptions) -> Result<Self, CliError> {
        let config = ConfigFile::load_from(&options.config_path())?;

        let logging_guard = init_logging(&config.logging.file, options.verbose, options.debug)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            runtime,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("offmap v{}", offmap::VERSION);
        info!(command, "offmap CLI command");
    }

    /// Create the service described by the loaded configuration.
    pub fn create_service(&self) -> Result<OfflineMapService<ReqwestClient>, CliError> {
        let service_config = self.config.service_config()?;
        let service = OfflineMapService::start(service_config)?;
        if !service.storage().is_persistent() {
            println!(
                "Warning: cache directory {} is unusable, running without a cache",
                self.config.cache.directory.display()
            );
        }
        Ok(service)
    }

    /// Drive a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Write bytes to a file.
    pub fn save(&self, path: &Path, data: &[u8]) -> Result<(), CliError> {
        std::fs::write(path, data).map_err(|e| CliError::FileWrite {
            path: path.display().to_string(),
            error: e,
        })?;
        info!(path = %path.display(), bytes = data.len(), "Saved output");
        Ok(())
    }
}
