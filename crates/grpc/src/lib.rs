//! gRPC clients for the upstream TTS (`ProtoAudioStream`) and STT
//! (`ProtoTranscribe`) services.

mod generated;

pub mod error;
pub mod stt_client;
pub mod tts_client;

pub use error::GrpcError;
pub use stt_client::{SttClient, SttEvent, SttSender, SttSession};
pub use tts_client::TtsClient;
