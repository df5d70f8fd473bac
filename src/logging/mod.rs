// Logging module - tracing subscriber setup
//
// Stdout always gets human-readable logs. When file logging is enabled, a
// second layer writes JSON lines to a rotating file through a non-blocking
// writer. The returned guard must be held until shutdown so buffered lines
// are flushed.

use crate::config::{LogFileConfig, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: RUST_LOG env var > configured level
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let default_filter = format!("samplesink={},axum=info", config.level);
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into())
}

/// Rolling JSON writer for the file sink
///
/// `None` when the directory cannot be created; logging then stays on stdout.
fn file_writer(file: &LogFileConfig) -> Option<RollingFileAppender> {
    if let Err(e) = std::fs::create_dir_all(&file.dir) {
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            file.dir, e
        );
        return None;
    }
    Some(RollingFileAppender::new(
        file.rotation.rotation(),
        &file.dir,
        &file.prefix,
    ))
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = build_filter(config);
    let stdout = tracing_subscriber::fmt::layer();

    let Some(appender) = config.file.enabled.then(|| file_writer(&config.file)).flatten() else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout)
            .init();
        return None;
    };

    // Writes happen on a background thread
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Some(guard)
}
