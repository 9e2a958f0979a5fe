//! Wire-level stream item types shared between the pipeline and the HTTP/WS
//! surface: the tagged unions produced by Chat-Synth and by the Encode Pipeline.

use std::sync::Arc;

/// Produced by Chat-Synth, consumed by the Encode Pipeline.
///
/// `Audio` carries raw PCM: 32-bit float, little-endian, at the TTS model's
/// declared sample rate and channel count.
#[derive(Debug, Clone)]
pub enum StreamItem {
    Text(Arc<str>),
    Audio(Arc<[u8]>),
}

impl StreamItem {
    pub fn text(s: impl Into<Arc<str>>) -> Self {
        StreamItem::Text(s.into())
    }

    pub fn audio(bytes: impl Into<Arc<[u8]>>) -> Self {
        StreamItem::Audio(bytes.into())
    }
}

/// Produced by the Encode Pipeline; terminal.
#[derive(Debug, Clone)]
pub enum EncodedItem {
    Text(Arc<str>),
    Encoded(Arc<[u8]>),
}

/// Output codec selection for the encode pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pcm,
    Wav,
    Mp3,
    Ogg,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pcm" => Some(Self::Pcm),
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "ogg" => Some(Self::Ogg),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Pcm => "audio/pcm",
            OutputFormat::Wav => "audio/wav",
            OutputFormat::Mp3 => "audio/mpeg",
            OutputFormat::Ogg => "audio/ogg",
        }
    }

    /// Whether this format bypasses FFmpeg entirely.
    pub fn is_shortcut(&self) -> bool {
        matches!(self, OutputFormat::Pcm | OutputFormat::Wav)
    }
}
