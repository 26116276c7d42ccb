//! User configuration stored in `~/.offmap/config.ini`.
//!
//! # Example
//!
//! ```
//! use offmap::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let service = config.service_config().unwrap();
//! assert_eq!(service.fetch().concurrency, config.download.concurrency);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    clamp_concurrency, default_cache_directory, default_log_file, DEFAULT_LOG_FILE_NAME,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    AssetSettings, CacheSettings, ConfigFile, DownloadSettings, LoggingSettings, PrewarmSettings,
    ProviderSettings,
};
