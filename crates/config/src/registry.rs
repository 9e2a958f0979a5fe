//! Builds the immutable per-process model registry from a parsed `AppConfig`.

use std::path::Path;

use gateway_core::{AudioConstants, ModelKind, ModelRecord, SamplingDefaults, Status};

use crate::error::ConfigError;
use crate::schema::{AppConfig, ModelConfigEntry, ModelKindConfig};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<(AppConfig, Vec<ModelRecord>), ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
    let app_config: AppConfig = serde_yaml::from_str(&raw)?;
    let registry = build_registry(&app_config)?;
    Ok((app_config, registry))
}

pub fn build_registry(config: &AppConfig) -> Result<Vec<ModelRecord>, ConfigError> {
    config.models.iter().map(build_one).collect()
}

fn build_one(entry: &ModelConfigEntry) -> Result<ModelRecord, ConfigError> {
    if entry.resolve_name.trim().is_empty() {
        return Err(ConfigError::InvalidRecord {
            resolve_name: entry.resolve_name.clone(),
            reason: "resolve_name must not be empty".to_string(),
        });
    }
    if entry.context_size == 0 {
        return Err(ConfigError::InvalidRecord {
            resolve_name: entry.resolve_name.clone(),
            reason: "context_size must be > 0".to_string(),
        });
    }

    let kind = match entry.kind {
        ModelKindConfig::Llm => ModelKind::Llm,
        ModelKindConfig::Tts => ModelKind::Tts,
        ModelKindConfig::Stt => ModelKind::Stt,
    };

    let audio = entry
        .audio
        .as_ref()
        .map(|a| AudioConstants { sample_rate: a.sample_rate, channels: a.channels })
        .unwrap_or_default();

    Ok(ModelRecord {
        resolve_name: entry.resolve_name.clone(),
        kind,
        upstream_url: entry.url.clone(),
        wire_model: entry.wire_model.clone().unwrap_or_else(|| entry.resolve_name.clone()),
        context_size: entry.context_size,
        sampling: SamplingDefaults {
            voice: entry.sampling.voice.clone(),
            speed: entry.sampling.speed.unwrap_or(1.0),
            temperature: entry.sampling.temperature,
            top_p: entry.sampling.top_p,
        },
        audio,
        default_prompt: entry.prompt.clone(),
        status: Status::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AppConfig;

    const YAML: &str = r#"
models:
  - resolve_name: gpt-oss-20b
    kind: llm
    url: http://llm:8080
    context_size: 8192
  - resolve_name: kokoro
    kind: tts
    url: http://tts:50051
    context_size: 2000
    audio:
      sample_rate: 24000
      channels: 1
"#;

    #[test]
    fn builds_registry_from_yaml() {
        let config: AppConfig = serde_yaml::from_str(YAML).unwrap();
        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry[1].audio.sample_rate, 24_000);
    }

    #[test]
    fn rejects_zero_context_size() {
        let bad = r#"
models:
  - resolve_name: x
    kind: llm
    url: http://x
    context_size: 0
"#;
        let config: AppConfig = serde_yaml::from_str(bad).unwrap();
        assert!(build_registry(&config).is_err());
    }
}
