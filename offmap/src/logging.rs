//! Logging infrastructure for offmap.
//!
//! - Writes to a log file (cleared on session start)
//! - Optionally mirrors to stdout
//! - Configurable via the RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize logging.
///
/// # Arguments
///
/// * `log_path` - Log file, truncated at startup
/// * `stdout` - Also print events to stdout
/// * `debug` - Default to `debug` instead of `info` when RUST_LOG is unset
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the file cannot
/// be cleared.
pub fn init_logging(log_path: &Path, stdout: bool, debug: bool) -> Result<LoggingGuard, io::Error> {
    prepare_log_file(log_path)?;

    let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .compact()
    });

    let default_level = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Create the log directory and truncate the log file.
fn prepare_log_file(log_path: &Path) -> Result<(), io::Error> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(log_path, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // init_logging installs a global subscriber, so only the file handling
    // is exercised here.

    #[test]
    fn test_creates_nested_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("deep").join("nested").join("offmap.log");

        prepare_log_file(&log_path).unwrap();

        assert!(log_path.exists());
        assert_eq!(fs::read_to_string(&log_path).unwrap(), "");
    }

    #[test]
    fn test_clears_existing_file() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("offmap.log");
        fs::write(&log_path, "old log data").unwrap();

        prepare_log_file(&log_path).unwrap();

        assert_eq!(fs::read_to_string(&log_path).unwrap(), "");
    }

    #[test]
    fn test_unwritable_location_errors() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        fs::write(&blocker, "x").unwrap();

        assert!(prepare_log_file(&blocker.join("offmap.log")).is_err());
    }

    #[test]
    fn test_guard_structure() {
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let _logging_guard = LoggingGuard { _file_guard: guard };
    }
}
