//! YAML config loading and model registry construction.
//!
//! Reads the gateway's config file (default path from `GATEWAY_CONFIG_PATH`,
//! falling back to `config.yaml`) and turns its `models:` list into the
//! immutable `Vec<ModelRecord>` that the rest of the gateway resolves against.

pub mod error;
pub mod registry;
pub mod schema;

pub use error::ConfigError;
pub use registry::{build_registry, load_from_file};
pub use schema::{AppConfig, AudioConfig, ModelConfigEntry, ModelKindConfig, SamplingConfig, ServerSection};

use std::path::PathBuf;

use gateway_core::ModelRecord;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG_PATH";

/// Resolve the config file path from the environment, falling back to the
/// current directory's `config.yaml`.
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load the config file at the environment-resolved path and build the
/// registry in one call. A malformed or missing config is fatal to startup.
pub fn load() -> Result<(ServerSection, Vec<ModelRecord>), ConfigError> {
    let path = config_path_from_env();
    let (app_config, registry) = load_from_file(&path)?;
    Ok((app_config.server, registry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_used_when_env_absent() {
        std::env::remove_var(CONFIG_PATH_ENV);
        assert_eq!(config_path_from_env(), PathBuf::from(DEFAULT_CONFIG_PATH));
    }
}
