//! Model registry domain types: the closed `{Llm, Tts, Stt}` sum, the immutable
//! per-process model record, and the mutex-protected health status that the
//! health worker writes and the `/v0/models` handler reads.

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Llm,
    Tts,
    Stt,
}

/// Audio constants carried by TTS/STT model records.
#[derive(Debug, Clone, Copy)]
pub struct AudioConstants {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for AudioConstants {
    fn default() -> Self {
        Self { sample_rate: 24_000, channels: 1 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SamplingDefaults {
    pub voice: Option<String>,
    pub speed: f32,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

/// Health fields mutated exclusively by the health worker, read concurrently by
/// API handlers. Each field gets its own mutex rather than one combined lock,
/// so a reader never blocks on a field it doesn't care about.
#[derive(Debug, Default)]
pub struct Status {
    ping_ok: Mutex<bool>,
    request_ok: Mutex<bool>,
    error: Mutex<Option<String>>,
}

impl Status {
    pub fn ping_ok(&self) -> bool {
        *self.ping_ok.lock()
    }

    pub fn set_ping_ok(&self, value: bool) {
        *self.ping_ok.lock() = value;
    }

    pub fn request_ok(&self) -> bool {
        *self.request_ok.lock()
    }

    pub fn set_request_ok(&self, value: bool) {
        *self.request_ok.lock() = value;
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }

    pub fn set_error(&self, value: Option<String>) {
        *self.error.lock() = value;
    }

    /// A model is "running" once both checks pass and no error has latched.
    pub fn running(&self) -> bool {
        self.ping_ok() && self.request_ok() && self.error().is_none()
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct StatusSnapshot {
    pub ping_ok: bool,
    pub request_ok: bool,
    pub error: Option<String>,
    pub running: bool,
}

impl From<&Status> for StatusSnapshot {
    fn from(s: &Status) -> Self {
        Self {
            ping_ok: s.ping_ok(),
            request_ok: s.request_ok(),
            error: s.error(),
            running: s.running(),
        }
    }
}

/// Immutable, per-process model record: resolve-name → (kind, upstream URL,
/// context size, sampling defaults, audio constants).
#[derive(Debug)]
pub struct ModelRecord {
    pub resolve_name: String,
    pub kind: ModelKind,
    pub upstream_url: String,
    pub wire_model: String,
    pub context_size: usize,
    pub sampling: SamplingDefaults,
    pub audio: AudioConstants,
    pub default_prompt: Option<String>,
    pub status: Status,
}

/// Triple (LLM?, TTS?, STT?) obtained by parsing a `+`-joined model string. Each
/// slot holds at most one model.
#[derive(Default)]
pub struct ResolvedModelSet<'a> {
    pub llm: Option<&'a ModelRecord>,
    pub tts: Option<&'a ModelRecord>,
    pub stt: Option<&'a ModelRecord>,
}

impl<'a> ResolvedModelSet<'a> {
    /// Parse a `+`-joined model string against the registry, enforcing the
    /// cardinality-at-most-one-per-slot invariant.
    pub fn resolve(model_field: &str, registry: &'a [ModelRecord]) -> Result<Self, GatewayError> {
        let mut set = ResolvedModelSet::default();

        for raw_name in model_field.split('+').map(str::trim).filter(|s| !s.is_empty()) {
            let record = registry
                .iter()
                .find(|m| m.resolve_name == raw_name)
                .ok_or_else(|| GatewayError::ModelNotFound(raw_name.to_string()))?;

            if !record.status.running() {
                return Err(GatewayError::ModelNotRunning(raw_name.to_string()));
            }

            let slot = match record.kind {
                ModelKind::Llm => &mut set.llm,
                ModelKind::Tts => &mut set.tts,
                ModelKind::Stt => &mut set.stt,
            };

            if slot.is_some() {
                return Err(GatewayError::Validation(format!(
                    "Only one {:?} model is allowed in '{model_field}'",
                    record.kind
                )));
            }
            *slot = Some(record);
        }

        Ok(set)
    }

    pub fn require_llm(&self) -> Result<&'a ModelRecord, GatewayError> {
        self.llm.ok_or_else(|| {
            GatewayError::Validation("LLM model is required for this request".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, kind: ModelKind) -> ModelRecord {
        let r = ModelRecord {
            resolve_name: name.to_string(),
            kind,
            upstream_url: "http://x".to_string(),
            wire_model: name.to_string(),
            context_size: 4096,
            sampling: SamplingDefaults::default(),
            audio: AudioConstants::default(),
            default_prompt: None,
            status: Status::default(),
        };
        r.status.set_ping_ok(true);
        r.status.set_request_ok(true);
        r
    }

    #[test]
    fn resolves_llm_tts_pair() {
        let registry = vec![record("gpt-oss-20b", ModelKind::Llm), record("kokoro", ModelKind::Tts)];
        let set = ResolvedModelSet::resolve("gpt-oss-20b+kokoro", &registry).unwrap();
        assert!(set.llm.is_some());
        assert!(set.tts.is_some());
        assert!(set.stt.is_none());
    }

    #[test]
    fn rejects_duplicate_kind_in_slot() {
        let registry = vec![record("a", ModelKind::Llm), record("b", ModelKind::Llm)];
        let err = ResolvedModelSet::resolve("a+b", &registry).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn missing_model_is_not_found() {
        let registry = vec![record("a", ModelKind::Llm)];
        let err = ResolvedModelSet::resolve("ghost", &registry).unwrap_err();
        assert!(matches!(err, GatewayError::ModelNotFound(_)));
    }

    #[test]
    fn not_running_model_is_rejected() {
        let registry = vec![record("a", ModelKind::Llm)];
        registry[0].status.set_ping_ok(false);
        let err = ResolvedModelSet::resolve("a", &registry).unwrap_err();
        assert!(matches!(err, GatewayError::ModelNotRunning(_)));
    }
}
