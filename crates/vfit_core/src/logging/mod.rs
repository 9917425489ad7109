//! Logging infrastructure for video-fit.
//!
//! This module provides:
//! - Application-wide `tracing` subscriber setup (stderr, optional file)
//! - A per-run [`JobLogger`] for the human-readable progress lines the
//!   user sees, with an optional log file and a tail buffer of encoder
//!   output for failure diagnosis
//!
//! # Example
//!
//! ```no_run
//! use vfit_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::console("clip.mp4", LogConfig::default(), None);
//! logger.phase("Probing");
//! logger.command("ffprobe -show_format clip.mp4");
//! logger.success("Done");
//! ```

mod job_logger;
mod types;

use std::path::Path;

pub use job_logger::{JobLogger, JobLoggerBuilder};
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Base name of application log files.
const LOG_FILE_PREFIX: &str = "compress";

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(env_filter(default_level))
        .init();
}

/// Initialize tracing with an additional daily-rotated log file.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the lifetime of the program.
pub fn init_tracing_with_file(
    default_level: LogLevel,
    log_dir: &Path,
) -> Result<WorkerGuard, InitError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(default_level))
        .init();

    Ok(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)))
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(level_to_filter_str(LogLevel::Debug), "debug");
        assert_eq!(level_to_filter_str(LogLevel::Warn), "warn");
    }
}
