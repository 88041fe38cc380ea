//! Tracing subscriber initialization.
//!
//! The engine itself only emits `tracing` events; hosts decide where they go.
//! [`init`] wires them to a log file for the demo binary so a scroll session
//! can be followed with `tail -f`.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Target for scroll-handling events (listener lifecycle, scroll positions).
pub const SCROLL_TARGET: &str = "cdrscroll::scroll";

/// Target for render diagnostics (window, pool, timings, contract violations).
pub const RENDER_TARGET: &str = "cdrscroll::render";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Log path has no parent directory
    #[error("Log path has no parent directory: {0:?}")]
    NoParentDirectory(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Default filter directive.
///
/// `debug` turns on the per-render diagnostics; otherwise only `info` and
/// above are kept.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "info,cdrscroll=debug"
    } else {
        "info"
    }
}

/// Initialize the tracing subscriber with file-based logging.
///
/// Respects `RUST_LOG`; falls back to [`default_directive`].
/// Creates the log directory if it doesn't exist.
///
/// # Errors
///
/// Fails if the directory cannot be created, the path has no file name, or a
/// global subscriber is already installed.
pub fn init(log_path: &Path, debug: bool) -> Result<(), LoggingError> {
    use tracing_subscriber::EnvFilter;

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LoggingError::DirectoryCreation {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = log_path
        .parent()
        .ok_or_else(|| LoggingError::NoParentDirectory(log_path.to_path_buf()))?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_target(true)
        .with_ansi(false) // No ANSI colors in log files
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}
