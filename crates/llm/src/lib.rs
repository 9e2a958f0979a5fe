//! Upstream LLM client: OpenAI-compatible wire types, SSE streaming, message
//! history limiting, and TTS prompt injection.

pub mod chat_types;
pub mod error;
pub mod limiter;
pub mod prompt;
pub mod sse;
pub mod validate;

pub use chat_types::{
    AudioResponse, ChatCompletionsChoiceStreaming, ChatCompletionsResponseStreaming, ChatDelta,
    ChatMessage, ChatPost, ChatPostAudio, Modality,
};
pub use error::LlmError;
pub use limiter::{count_tokens, limit_messages};
pub use prompt::{include_system_if_needed, LLM_TTS_PROMPT};
pub use sse::stream_chat;
pub use validate::validate_messages;
