//! On-disk YAML shape of the config file.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub models: Vec<ModelConfigEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
}

fn default_listen_port() -> u16 {
    8000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen_port: default_listen_port() }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelKindConfig {
    Llm,
    Tts,
    Stt,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SamplingConfig {
    pub voice: Option<String>,
    pub speed: Option<f32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AudioConfig {
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: u16,
}

fn default_channels() -> u16 {
    1
}

/// One entry of the `models:` list. `wire_model` defaults to `resolve_name` when
/// absent, so a model can be addressed by a short name while forwarding the
/// upstream's own model identifier on the wire.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfigEntry {
    pub resolve_name: String,
    pub kind: ModelKindConfig,
    pub url: String,
    pub wire_model: Option<String>,
    pub context_size: usize,
    #[serde(default)]
    pub sampling: SamplingConfig,
    pub audio: Option<AudioConfig>,
    pub prompt: Option<String>,
}
