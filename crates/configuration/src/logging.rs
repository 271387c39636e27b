use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global tracing subscriber.
///
/// Console output always goes to stderr. When a log directory is configured a
/// second, non-blocking layer writes to a daily rolling file; the returned
/// guard must be held until shutdown so buffered lines are flushed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::rfc_3339())
        .with_target(false);

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = fmt::layer().with_writer(writer).with_ansi(false);

            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .try_init()
                .map_err(|e| ConfigError::LoggingError(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .try_init()
                .map_err(|e| ConfigError::LoggingError(e.to_string()))?;
            Ok(None)
        }
    }
}
