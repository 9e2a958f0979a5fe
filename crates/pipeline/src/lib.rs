//! The streaming fusion pipeline: sentence collection, batching, the
//! chat-synth fusion of LLM and TTS streams, and audio encoding.

pub mod chat_synth;
pub mod decode;
pub mod encode;
pub mod sentence_batcher;
pub mod sentence_collector;

pub use chat_synth::{chat_synth, ChatSynthConfig};
pub use decode::{decode_to_pcm, run_decoder};
pub use encode::encode_pipeline;
pub use sentence_batcher::SentenceBatcher;
pub use sentence_collector::SentenceCollector;
