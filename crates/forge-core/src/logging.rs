use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::ForgeError;

const LOG_FILE_PREFIX: &str = "token-forge";

/// `RUST_LOG` wins when set; otherwise `filter` applies.
fn env_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
}

/// Install a compact console subscriber.
///
/// Fails instead of panicking when a global subscriber already exists.
pub fn init_logging(filter: &str) -> Result<(), ForgeError> {
    tracing_subscriber::registry()
        .with(env_filter(filter))
        .with(fmt::layer().with_target(false).with_thread_ids(false).compact())
        .try_init()
        .map_err(|e| ForgeError::Config(format!("failed to initialize logging: {e}")))
}

/// Console output plus a daily-rotated log file under `logs_dir`.
///
/// Keep the returned guard alive for as long as logs should be flushed.
pub fn init_logging_to_dir(logs_dir: &Path, filter: &str) -> Result<WorkerGuard, ForgeError> {
    std::fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(filter))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .with(fmt::layer().with_target(false).with_thread_ids(false).compact())
        .try_init()
        .map_err(|e| ForgeError::Config(format!("failed to initialize logging: {e}")))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_to_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let logs_dir = tmp.path().join("nested").join("logs");
        assert!(!logs_dir.exists());

        // Another test may already own the global subscriber; the directory
        // is created either way.
        let result = init_logging_to_dir(&logs_dir, "warn");
        assert!(logs_dir.exists());
        drop(result);
    }

    #[test]
    fn second_init_reports_error_instead_of_panicking() {
        let tmp = tempfile::tempdir().unwrap();
        let _first = init_logging_to_dir(tmp.path(), "info");

        let err = init_logging("debug").unwrap_err();
        assert!(err.to_string().contains("failed to initialize logging"));
    }

    #[test]
    fn env_filter_accepts_directives() {
        for f in ["info", "forge_core=debug,warn", "chain_sol=trace"] {
            drop(env_filter(f));
        }
    }
}
