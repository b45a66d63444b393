//! Logging configuration using tracing

use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Initialize the logging subsystem
///
/// Logs are written to `<log_dir>/stoat.log`, rotated daily.
/// Log level is controlled by the `STOAT_LOG` environment variable.
///
/// # Examples
/// ```bash
/// STOAT_LOG=debug stoat run
/// STOAT_LOG=trace stoat run
/// ```
pub fn init(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "stoat.log");

    // Default to info, allow override via STOAT_LOG
    let env_filter = EnvFilter::try_from_env("STOAT_LOG").unwrap_or_else(|_| {
        EnvFilter::new("stoat=info,stoat_core=info,stoat_engine=info,stoat_app=info,warn")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("Stoat starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // init installs the process-global subscriber, so it gets exactly one
    // test in this binary
    #[test]
    fn test_init_creates_log_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        init(&log_dir).unwrap();

        assert!(log_dir.is_dir());
        let has_log_file = std::fs::read_dir(&log_dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .any(|entry| entry.file_name().to_string_lossy().starts_with("stoat.log"));
        assert!(has_log_file);
    }
}
