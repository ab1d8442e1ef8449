//! Logging infrastructure for seatrace.
//!
//! Structured tracing output to a session log file and to stdout:
//! - Writes to `logs/seatrace.log` (cleared on session start)
//! - Also prints to stdout for terminal tailing
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
/// Dropping it flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Default log directory.
pub fn default_log_dir() -> &'static str {
    "logs"
}

/// Default log file name.
pub fn default_log_file() -> &'static str {
    "seatrace.log"
}

/// Initialize the logging system.
///
/// Creates the log directory if needed, clears the previous session's log
/// file, and installs a global subscriber with a non-blocking file layer
/// plus a compact stdout layer. The filter defaults to `info` when
/// `RUST_LOG` is unset.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(log_dir: &str, log_file: &str) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(log_dir)?;

    // Clear the previous session's log so one file holds one session
    let log_path = Path::new(log_dir).join(log_file);
    fs::write(&log_path, "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .compact();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("seatrace-logging-{}", name));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_default_paths() {
        assert_eq!(default_log_dir(), "logs");
        assert_eq!(default_log_file(), "seatrace.log");
    }

    // init_logging itself installs a process-global subscriber and can only
    // run once per test binary, so the file handling is exercised directly.

    #[test]
    fn test_log_directory_and_file_are_created() {
        let dir = scratch_dir("create");
        fs::create_dir_all(&dir).expect("create log dir");
        let path = dir.join("seatrace.log");
        fs::write(&path, "").expect("create log file");

        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn test_previous_session_log_is_cleared() {
        let dir = scratch_dir("clear");
        fs::create_dir_all(&dir).expect("create log dir");
        let path = dir.join("seatrace.log");
        fs::write(&path, "stale session output").expect("seed old log");

        fs::write(&path, "").expect("clear log file");
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        fs::remove_dir_all(&dir).expect("cleanup");
    }
}
