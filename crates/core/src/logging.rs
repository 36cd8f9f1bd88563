use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Directory for rolling log files. Unset means stderr only.
pub const LOG_DIR_ENV: &str = "DOCINDEX_LOG_DIR";

/// Installs the global subscriber: stderr always, plus a daily rolling file
/// named after `component` when [`LOG_DIR_ENV`] is set.
///
/// The returned guard must be held until exit so buffered file output is
/// flushed.
pub fn init_logging(component: &str) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false);

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer);

    let Some(log_dir) = std::env::var_os(LOG_DIR_ENV).map(PathBuf::from) else {
        let _ = registry.try_init();
        return None;
    };
    let _ = std::fs::create_dir_all(&log_dir);

    // Files like index2search.log.2024-01-21
    let file_appender = tracing_appender::rolling::daily(&log_dir, component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let _ = registry.with(file_layer).try_init();
    Some(guard)
}
