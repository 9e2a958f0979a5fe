//! `POST /oai/v1/audio/transcriptions`: decode the uploaded file to PCM,
//! stream it through the upstream STT model, and relay each decoded event as
//! one newline-delimited JSON object.

use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use gateway_core::{GatewayError, ResolvedModelSet};
use gateway_grpc::{SttClient, SttEvent};
use gateway_pipeline::decode_to_pcm;

use crate::state::AppState;

/// Upload chunks are re-sliced to this size before handing them to the gRPC
/// session, bounding per-message payload size.
const SEND_CHUNK_BYTES: usize = 32 * 1024;

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum TranscriptionEvent {
    SpeechStart { timestamp: f64 },
    SpeechStop { timestamp: f64 },
    Transcription { text: String, timestamp: f64 },
}

impl From<SttEvent> for TranscriptionEvent {
    fn from(event: SttEvent) -> Self {
        match event {
            SttEvent::SpeechStart { timestamp } => TranscriptionEvent::SpeechStart { timestamp },
            SttEvent::SpeechStop { timestamp } => TranscriptionEvent::SpeechStop { timestamp },
            SttEvent::Transcription { text, timestamp } => TranscriptionEvent::Transcription { text, timestamp },
        }
    }
}

pub async fn audio_transcriptions(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, GatewayError> {
    let mut model_field: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| GatewayError::Validation(e.to_string()))? {
        match field.name() {
            Some("model") => {
                model_field = Some(field.text().await.map_err(|e| GatewayError::Validation(e.to_string()))?);
            }
            Some("file") => {
                file_bytes = Some(field.bytes().await.map_err(|e| GatewayError::Validation(e.to_string()))?.to_vec());
            }
            _ => {}
        }
    }

    let model_field = model_field.ok_or_else(|| GatewayError::Validation("missing 'model' field".to_string()))?;
    let file_bytes = file_bytes.ok_or_else(|| GatewayError::Validation("missing 'file' field".to_string()))?;

    let resolved = ResolvedModelSet::resolve(&model_field, &state.registry)?;
    let stt = resolved
        .stt
        .ok_or_else(|| GatewayError::Validation("no stt model was resolved from 'model'".to_string()))?;

    let pcm = decode_to_pcm(&file_bytes, stt.audio.sample_rate, stt.audio.channels)
        .await
        .map_err(|e| GatewayError::Internal(format!("failed to decode uploaded audio: {e}")))?;

    let mut client = SttClient::connect(&stt.upstream_url)
        .await
        .map_err(|e| GatewayError::Connection(format!("failed to connect to stt model '{}': {e}", stt.resolve_name)))?;

    let session = client
        .transcribe(&stt.wire_model)
        .await
        .map_err(|e| GatewayError::Connection(format!("stt transcribe failed: {e}")))?;

    let (sender, mut events) = session.split();
    for chunk in pcm.chunks(SEND_CHUNK_BYTES) {
        if sender.send_audio(chunk.to_vec()).await.is_err() {
            break;
        }
    }
    drop(sender);

    let body = async_stream::stream! {
        while let Some(result) = events.recv().await {
            match result {
                Ok(event) => {
                    let line = TranscriptionEvent::from(event);
                    let mut json = serde_json::to_string(&line).unwrap_or_default();
                    json.push('\n');
                    yield Ok::<_, std::io::Error>(json.into_bytes());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stt event stream error, ending transcription response");
                    break;
                }
            }
        }
    };

    Ok((
        [(axum::http::header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(body),
    )
        .into_response())
}
