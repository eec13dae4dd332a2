//! Logging configuration using tracing

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the log filter, e.g. `SITESMITH_LOG=debug`.
pub const LOG_ENV: &str = "SITESMITH_LOG";

/// Initialize the logging subsystem.
///
/// Everything the filter lets through goes to a daily-rolling file in
/// `log_dir`; warnings and errors are echoed to stderr. The returned guard
/// flushes the file writer on drop and must be held until exit.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "sitesmith.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Default to info, allow override via SITESMITH_LOG
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .with_filter(LevelFilter::WARN),
        )
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::info!("sitesmith starting, logging to {}", log_dir.display());
    Ok(guard)
}
