//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files plus `CATALOG__*` environment variables. Each
//! sub-module represents a logical configuration section; every field has a
//! default so an empty configuration is valid.

pub mod ipc;
pub mod logging;
pub mod registry;
pub mod sources;

use serde::{Deserialize, Serialize};

use self::ipc::IpcConfig;
use self::logging::LoggingConfig;
use self::registry::RegistryConfig;
use self::sources::StaticSourceConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Entity registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Cross-process channel settings.
    #[serde(default)]
    pub ipc: IpcConfig,
    /// Static descriptor files registered as sources at startup.
    #[serde(default)]
    pub sources: Vec<StaticSourceConfig>,
}

impl AppConfig {
    /// Load configuration from two file stems, `base` then `overlay`.
    ///
    /// Environment variables prefixed with `CATALOG__` override both.
    /// Missing files are skipped.
    pub fn load_from(base: &str, overlay: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(overlay).required(false))
            .add_source(
                config::Environment::with_prefix("CATALOG")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
