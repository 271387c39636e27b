use crate::error::ConfigError;
use crate::settings::Config;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{AccountSettings, AnalyticsSettings, LogLevel, LoggingSettings};

/// The file looked up when no explicit path is given. It is optional.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `PAPERTRAIL__ANALYTICS__ROLLING_WINDOW=20`.
pub const ENV_PREFIX: &str = "PAPERTRAIL";

/// Loads and validates the application configuration.
///
/// An explicit `path` must exist. Without one, `config.toml` in the working
/// directory is used if present and built-in defaults fill every gap.
/// Environment variables take precedence over the file.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}
