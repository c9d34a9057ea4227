//! Tracing subscriber setup.
//!
//! Hosts embedding the library and the CLI share one setup: a human-readable
//! stderr layer plus an optional daily-rotated log file. `RUST_LOG` takes
//! precedence over the configured level.

use std::path::{Path, PathBuf};

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::DEFAULT_LOG_LEVEL;

/// Errors that can occur while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log file location is unusable.
    #[error("cannot log to {}: {reason}", .path.display())]
    LogFile { path: PathBuf, reason: String },

    /// A global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Keeps the background log writer alive.
///
/// Dropping the guard flushes buffered file output; hold it for the lifetime
/// of the process.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Build the level filter: `RUST_LOG` first, then `level`, then the default.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(level))
}

/// Filter for a configured directive, falling back to the default level when
/// the directive does not parse.
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber.
///
/// # Arguments
///
/// * `level` - Filter directive used when `RUST_LOG` is unset
/// * `log_file` - Optional log file; rotated daily with a date suffix
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<LoggingGuard, LoggingError> {
    let timer = OffsetTime::local_rfc_3339().unwrap_or_else(|_| OffsetTime::new(UtcOffset::UTC, Rfc3339));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_target(false);

    let (file_layer, file_guard) = match log_file {
        Some(path) => {
            let appender = rolling_appender(path)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(timer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn rolling_appender(path: &Path) -> Result<RollingFileAppender, LoggingError> {
    let log_err = |reason: String| LoggingError::LogFile {
        path: path.to_path_buf(),
        reason,
    };

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| log_err("path has no file name".to_string()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name)
        .build(dir)
        .map_err(|e| log_err(e.to_string()))
}
