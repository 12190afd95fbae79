//! Log subscriber setup
//!
//! The terminal belongs to the line editor, so logs only ever go to a
//! daily-rotated file under `<data_dir>/ghostsh/logs`.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "GHOSTSH_LOG";
const DEFAULT_LEVEL: &str = "warn";

pub fn log_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("ghostsh").join("logs"))
}

/// `level` wins over `GHOSTSH_LOG`, which wins over the `warn` default.
pub fn build_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => EnvFilter::try_new(level).context(format!("Invalid log level: {level}")),
        None => Ok(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))),
    }
}

/// Install the global subscriber. The returned guard flushes pending
/// records when dropped and must live until exit.
pub fn init(level: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(level)?;
    let Some(dir) = log_dir() else {
        return Ok(None);
    };
    std::fs::create_dir_all(&dir).context(format!("Failed to create log directory: {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, "ghostsh.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install log subscriber")?;
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_must_parse() {
        assert!(build_filter(Some("debug")).is_ok());
        assert!(build_filter(Some("ghostsh_core=trace,warn")).is_ok());
        assert!(build_filter(Some("ghostsh_core=loudest")).is_err());
    }
}
