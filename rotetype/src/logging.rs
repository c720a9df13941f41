use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ROTETYPE_LOG";
pub const LOG_FILE: &str = "rotetype.log";

/// Builds the filter from `--log-level`, then `ROTETYPE_LOG`, then `info`
fn filter(level: Option<&str>) -> EnvFilter {
    level
        .and_then(|level| EnvFilter::try_new(level).ok())
        .or_else(|| EnvFilter::try_from_env(LOG_ENV).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Starts logging to `<directory>/rotetype.log`.
///
/// The terminal belongs to the UI, so nothing is ever written to stdout. Returns the guard that
/// flushes the log on drop, or `None` if logging could not be set up.
pub fn init(directory: &Path, level: Option<&str>) -> Option<WorkerGuard> {
    if let Err(error) = std::fs::create_dir_all(directory) {
        eprintln!("Logging disabled, could not create {}: {error}", directory.display());
        return None;
    }

    let file_appender = tracing_appender::rolling::never(directory, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|()| guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_precedence() {
        assert_eq!(filter(Some("debug")).to_string(), "debug");
        assert_eq!(filter(Some("rote=trace")).to_string(), "rote=trace");
    }
}
