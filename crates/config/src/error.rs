use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("failed to parse config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid model record '{resolve_name}': {reason}")]
    InvalidRecord { resolve_name: String, reason: String },
}
