//! OpenAI-compatible chat-completions wire types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System { content: String },
    User { content: String },
    Assistant {
        content: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        reasoning_content: Option<String>,
    },
}

impl ChatMessage {
    pub fn content(&self) -> &str {
        match self {
            ChatMessage::System { content } => content,
            ChatMessage::User { content } => content,
            ChatMessage::Assistant { content, .. } => content,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, ChatMessage::System { .. })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Audio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPostAudio {
    pub voice: Option<String>,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPost {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_modalities")]
    pub modalities: Vec<Modality>,
    #[serde(default)]
    pub audio: Option<ChatPostAudio>,
    pub stream: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

fn default_modalities() -> Vec<Modality> {
    vec![Modality::Text]
}

impl ChatPost {
    pub fn wants_audio(&self) -> bool {
        self.modalities.contains(&Modality::Audio)
    }
}

/// Audio payload embedded in a streamed delta or a full message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl AudioResponse {
    /// Build the audio response for one PCM chunk. `id` is `Some` only on
    /// the first item of the stream overall, whichever kind that is.
    pub fn from_bytes(bytes: &[u8], id: Option<String>) -> Self {
        use base64::Engine;
        Self { id, data: Some(base64::engine::general_purpose::STANDARD.encode(bytes)), transcript: None }
    }

    /// Build the audio response for a text marker, carried as `transcript`
    /// rather than `content` once audio output was requested.
    pub fn from_transcript(text: String, id: Option<String>) -> Self {
        Self { id, data: None, transcript: Some(text) }
    }

    pub fn generate_id() -> String {
        format!("audio_{}", hex_id())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionsChoiceStreaming {
    #[serde(default)]
    pub index: u32,
    pub delta: ChatDelta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionsResponseStreaming {
    pub id: String,
    #[serde(default = "object_chunk")]
    pub object: String,
    pub choices: Vec<ChatCompletionsChoiceStreaming>,
    pub created: i64,
    pub model: String,
}

fn object_chunk() -> String {
    "chat.completion.chunk".to_string()
}

impl ChatCompletionsResponseStreaming {
    pub fn generate_id() -> String {
        format!("msg_{}", hex_id())
    }

    /// Frame this chunk as one `data: {json}\n\n` SSE event.
    pub fn to_sse(&self) -> String {
        format!("data: {}\n\n", serde_json::to_string(self).expect("chunk serializes"))
    }
}

/// 24 hex chars, the same width OpenAI's own chunk ids use.
fn hex_id() -> String {
    let bytes = uuid::Uuid::new_v4();
    let (hi, lo) = bytes.as_u64_pair();
    format!("{hi:016x}{:08x}", lo as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_roundtrips_role_tag() {
        let json = r#"{"role":"user","content":"hi"}"#;
        let message: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.content(), "hi");
        assert!(!message.is_system());
    }

    #[test]
    fn assistant_omits_reasoning_when_absent() {
        let message = ChatMessage::Assistant { content: "ok".to_string(), reasoning_content: None };
        let json = serde_json::to_string(&message).unwrap();
        assert!(!json.contains("reasoning_content"));
    }

    #[test]
    fn audio_response_omits_absent_fields() {
        let audio = AudioResponse::from_transcript("hello".to_string(), None);
        let json = serde_json::to_string(&audio).unwrap();
        assert!(!json.contains("\"data\""));
        assert!(!json.contains("\"id\""));
    }
}
