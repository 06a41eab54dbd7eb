//! Tracing setup for the simulator binary.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::RuntimeConfig;

const LOG_FILE: &str = "combat.log";

/// Installs the global subscriber.
///
/// Warnings and above go to stderr unless `RUST_LOG` says otherwise. When a
/// log directory is configured (or file logging is requested, which falls
/// back to the platform cache directory), everything at `info` and above is also
/// written to `<log_dir>/<session_id>/combat.log`. Keep the returned guard
/// alive until the program exits or buffered file output is lost.
pub fn init(config: &RuntimeConfig) -> std::io::Result<Option<WorkerGuard>> {
    let stderr_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let log_dir = match &config.log_dir {
        Some(dir) => Some(dir.clone()),
        None if config.file_log => default_log_dir(),
        None => None,
    };
    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry().with(stderr_layer).init();
        return Ok(None);
    };

    let session_dir = session_log_dir(&log_dir, &config.session_id());
    std::fs::create_dir_all(&session_dir)?;

    let file_appender = tracing_appender::rolling::never(&session_dir, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!("Log file: {}", session_dir.join(LOG_FILE).display());
    Ok(Some(guard))
}

/// Platform cache directory for logs when none is configured explicitly.
pub fn default_log_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "combat-sim").map(|dirs| dirs.cache_dir().join("logs"))
}

fn session_log_dir(base: &Path, session_id: &str) -> PathBuf {
    base.join(session_id)
}
