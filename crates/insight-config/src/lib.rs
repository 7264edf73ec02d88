//! Configuration management.

mod settings;

pub use settings::{
    AnalysisConfig, AppConfig, AppSettings, DataConfig, LoggingConfig, RateLimitConfig,
    SyntheticSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from a required file and the environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    build(Some(path), true)
}

/// Load configuration from an optional file and the environment.
///
/// A missing file yields the defaults overridden by `INSIGHT__*` variables.
pub fn load_config_or_default(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    build(path, false)
}

fn build(path: Option<&Path>, required: bool) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(required));
    }
    let config = builder
        .add_source(
            Environment::with_prefix("INSIGHT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// Render the effective configuration as TOML.
pub fn to_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}
