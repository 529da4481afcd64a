//! # Configuration Management
//!
//! Layered configuration for the issuer: built-in defaults, an optional
//! TOML/YAML/JSON file, then `CFSSL_ISSUER__*` environment variables
//! (`CFSSL_ISSUER__CLIENT__USER_AGENT=...`).

pub mod settings;

pub use settings::{AppConfig, ClientConfig, ObservabilityConfig};

use std::path::Path;

use crate::errors::Result;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "CFSSL_ISSUER";

/// Load and validate the configuration.
pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = config::Config::builder()
        .add_source(config::Config::try_from(&AppConfig::default())?);

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let config: AppConfig = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__"))
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}
