pub mod audio_speech;
pub mod audio_transcriptions;
pub mod chat_completions;
pub mod models;
