//! `POST /oai/v1/chat/completions`: the text-only SSE relay and the
//! audio-modality fusion path.

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::Stream;
use futures::StreamExt;

use gateway_core::{EncodedItem, GatewayError, OutputFormat, ResolvedModelSet};
use gateway_grpc::TtsClient;
use gateway_llm::{
    include_system_if_needed, limit_messages, validate_messages, AudioResponse, ChatCompletionsChoiceStreaming,
    ChatCompletionsResponseStreaming, ChatDelta, ChatPost,
};
use gateway_pipeline::{chat_synth, encode_pipeline, ChatSynthConfig};

use crate::state::AppState;

pub async fn chat_completions(
    State(state): State<AppState>,
    Json(mut post): Json<ChatPost>,
) -> Result<Response, GatewayError> {
    validate_messages(&post.messages)?;

    let resolved = ResolvedModelSet::resolve(&post.model, &state.registry)?;
    let llm = resolved.require_llm()?;
    let needs_tts = post.wants_audio();

    if needs_tts && resolved.tts.is_none() {
        return Err(GatewayError::Validation(
            "audio modality requested but no tts model was resolved".to_string(),
        ));
    }
    if needs_tts && !post.stream {
        // Chat-Synth and the encode pipeline are fundamentally streaming
        // designs with no buffered fallback, so reject rather than silently
        // collecting the whole response before replying.
        return Err(GatewayError::Validation(
            "audio modality requires \"stream\": true".to_string(),
        ));
    }

    let messages = include_system_if_needed(post.messages.clone(), needs_tts, llm.default_prompt.as_deref());
    let messages = limit_messages(messages, llm.context_size);
    post.messages = messages;
    post.model = llm.wire_model.clone();
    post.stream = true;

    let wire_model = post.model.clone();
    let requested_model = llm.resolve_name.clone();
    let upstream_url = llm.upstream_url.clone();
    let llm_stream = gateway_llm::stream_chat(state.http.clone(), upstream_url, post);

    let sse_stream: std::pin::Pin<Box<dyn Stream<Item = Result<Event, std::convert::Infallible>> + Send>> =
        if needs_tts {
            let tts = resolved.tts.expect("checked above");
            let tts_client = TtsClient::connect(&tts.upstream_url).await.map_err(|e| {
                GatewayError::Connection(format!("failed to connect to tts model '{}': {e}", tts.resolve_name))
            })?;

            let config = ChatSynthConfig {
                tts_model: tts.wire_model.clone(),
                voice: tts.sampling.voice.clone().unwrap_or_default(),
                speed: if tts.sampling.speed > 0.0 { tts.sampling.speed } else { 1.0 },
                tts_context_size: tts.context_size,
            };

            let format = OutputFormat::Pcm;
            let items = chat_synth(llm_stream, tts_client, config);
            let encoded = encode_pipeline(items, format, tts.audio.sample_rate, tts.audio.channels);

            Box::pin(audio_sse(encoded, requested_model))
        } else {
            Box::pin(text_sse(llm_stream, requested_model, wire_model))
        };

    Ok(Sse::new(sse_stream).into_response())
}

fn text_sse(
    llm_stream: impl Stream<Item = Result<ChatCompletionsResponseStreaming, gateway_llm::LlmError>> + Send + 'static,
    requested_model: String,
    _wire_model: String,
) -> impl Stream<Item = Result<Event, std::convert::Infallible>> {
    async_stream::stream! {
        futures::pin_mut!(llm_stream);
        while let Some(next) = llm_stream.next().await {
            match next {
                Ok(mut chunk) => {
                    chunk.model = requested_model.clone();
                    yield Ok(Event::default().data(serde_json::to_string(&chunk).unwrap_or_default()));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "llm stream error, ending sse response");
                    break;
                }
            }
        }
        yield Ok(Event::default().data("[DONE]"));
    }
}

fn unix_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn audio_sse(
    encoded: impl Stream<Item = EncodedItem> + Send + 'static,
    requested_model: String,
) -> impl Stream<Item = Result<Event, std::convert::Infallible>> {
    async_stream::stream! {
        futures::pin_mut!(encoded);
        let mut first_item = true;

        while let Some(item) = encoded.next().await {
            let audio_id = first_item.then(AudioResponse::generate_id);
            first_item = false;

            let audio = match item {
                EncodedItem::Text(t) => AudioResponse::from_transcript(t.to_string(), audio_id),
                EncodedItem::Encoded(bytes) => AudioResponse::from_bytes(&bytes, audio_id),
            };
            let delta = ChatDelta { role: None, content: None, audio: Some(audio) };

            let chunk = ChatCompletionsResponseStreaming {
                id: ChatCompletionsResponseStreaming::generate_id(),
                object: "chat.completion.chunk".to_string(),
                choices: vec![ChatCompletionsChoiceStreaming { index: 0, delta, finish_reason: None }],
                created: unix_timestamp(),
                model: requested_model.clone(),
            };
            yield Ok(Event::default().data(serde_json::to_string(&chunk).unwrap_or_default()));
        }

        let stop_chunk = ChatCompletionsResponseStreaming {
            id: ChatCompletionsResponseStreaming::generate_id(),
            object: "chat.completion.chunk".to_string(),
            choices: vec![ChatCompletionsChoiceStreaming {
                index: 0,
                delta: ChatDelta::default(),
                finish_reason: Some("stop".to_string()),
            }],
            created: unix_timestamp(),
            model: requested_model.clone(),
        };
        yield Ok(Event::default().data(serde_json::to_string(&stop_chunk).unwrap_or_default()));

        yield Ok(Event::default().data("[DONE]"));
    }
}
