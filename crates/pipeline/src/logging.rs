//! Logging initialisation

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::LoggingConfig;
use crate::PipelineError;

/// Install the global tracing subscriber.
///
/// Logs go to stderr so stdout stays free for frame reports. Fails if a
/// subscriber is already installed or the level is not recognised.
pub fn init_logging(config: &LoggingConfig) -> Result<(), PipelineError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| PipelineError::Logging(format!("unknown log level '{}'", config.level)))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| PipelineError::Logging(e.to_string()))
}
