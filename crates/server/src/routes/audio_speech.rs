//! `POST /oai/v1/audio/speech`: a single-batch text-to-speech request,
//! reusing the Encode Pipeline on a one-item `StreamItem` sequence.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde::Deserialize;

use gateway_core::{GatewayError, OutputFormat, ResolvedModelSet, StreamItem};
use gateway_grpc::TtsClient;
use gateway_pipeline::encode_pipeline;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AudioSpeechPost {
    pub model: String,
    pub text: String,
    pub voice: Option<String>,
    #[serde(default = "default_format")]
    pub response_format: String,
    pub speed: Option<f32>,
}

fn default_format() -> String {
    "mp3".to_string()
}

pub async fn audio_speech(
    State(state): State<AppState>,
    Json(post): Json<AudioSpeechPost>,
) -> Result<Response, GatewayError> {
    let resolved = ResolvedModelSet::resolve(&post.model, &state.registry)?;
    let tts = resolved
        .tts
        .ok_or_else(|| GatewayError::Validation("no tts model was resolved from 'model'".to_string()))?;

    let format = OutputFormat::parse(&post.response_format)
        .ok_or_else(|| GatewayError::Validation(format!("unsupported response_format '{}'", post.response_format)))?;

    let voice = post.voice.or_else(|| tts.sampling.voice.clone()).unwrap_or_default();
    let speed = post.speed.unwrap_or(if tts.sampling.speed > 0.0 { tts.sampling.speed } else { 1.0 });

    let mut client = TtsClient::connect(&tts.upstream_url)
        .await
        .map_err(|e| GatewayError::Connection(format!("failed to connect to tts model '{}': {e}", tts.resolve_name)))?;

    let pcm_stream = client
        .stream_audio(&tts.wire_model, &post.text, &voice, speed)
        .await
        .map_err(|e| GatewayError::Connection(format!("tts stream_audio failed: {e}")))?;

    let items = async_stream::stream! {
        futures::pin_mut!(pcm_stream);
        while let Some(chunk) = pcm_stream.next().await {
            match chunk {
                Ok(pcm) => yield StreamItem::audio(pcm),
                Err(e) => {
                    tracing::warn!(error = %e, "tts stream error in audio/speech, ending early");
                    break;
                }
            }
        }
    };

    let encoded = encode_pipeline(items, format, tts.audio.sample_rate, tts.audio.channels);
    futures::pin_mut!(encoded);

    let mut body = Vec::new();
    while let Some(item) = encoded.next().await {
        if let gateway_core::EncodedItem::Encoded(bytes) = item {
            body.extend_from_slice(&bytes);
        }
    }

    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}
