//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use offmap::config::ConfigFileError;
use offmap::coord::CoordError;
use offmap::fetcher::DownloadError;
use offmap::service::ServiceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be read or written
    Config(ConfigFileError),
    /// Invalid coordinates, zoom levels or area
    InvalidArgument(CoordError),
    /// Failed to build the async runtime
    Runtime(std::io::Error),
    /// A service operation failed
    Service(ServiceError),
    /// Failed to write output file
    FileWrite { path: String, error: std::io::Error },
    /// A routed request produced no content
    Unavailable { url: String, status: u16 },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Service(ServiceError::Download(DownloadError::AlreadyInProgress)) => {
                eprintln!();
                eprintln!("Only one area download can run at a time.");
            }
            CliError::Service(ServiceError::Download(DownloadError::TooManyTiles { .. })) => {
                eprintln!();
                eprintln!("Narrow the area or zoom range, or raise [download] max_tiles in the config file.");
            }
            CliError::Config(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Fix the value in the config file or regenerate it with:");
                eprintln!("  offmap config init --force");
            }
            CliError::Unavailable { .. } => {
                eprintln!();
                eprintln!("The resource is not cached and the network is unavailable.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Service(e) => write!(f, "{}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
            CliError::Unavailable { url, status } => {
                write!(f, "{} unavailable (status {})", url, status)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::InvalidArgument(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Service(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::InvalidArgument(e)
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Service(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CliError::Unavailable {
            url: "https://t/1/2/3".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "https://t/1/2/3 unavailable (status 404)");

        let err: CliError = CoordError::InvalidZoom(40).into();
        assert!(err.to_string().contains("40"));

        let err: CliError = ServiceError::from(DownloadError::TooManyTiles {
            requested: 1_000_000,
            limit: 100_000,
        })
        .into();
        assert_eq!(
            err.to_string(),
            "Area covers 1000000 tiles, more than the limit of 100000"
        );
    }

    #[test]
    fn test_service_error_source() {
        use std::error::Error;
        let err: CliError = ServiceError::from(DownloadError::AlreadyInProgress).into();
        assert!(err.source().is_some());
    }
}
