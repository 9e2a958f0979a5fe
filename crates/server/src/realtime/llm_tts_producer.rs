//! LLM/TTS producer: turns queued user text into an assistant turn, running
//! Chat-Synth and chunking its audio for the WS sender, honoring barge-in at
//! every `StreamItem` boundary.

use std::sync::Arc;

use futures::StreamExt;
use gateway_core::{ModelRecord, StreamItem};
use gateway_grpc::TtsClient;
use gateway_llm::{limit_messages, ChatMessage, ChatPost};
use gateway_pipeline::{chat_synth, ChatSynthConfig};
use tokio::sync::mpsc;

use super::session::{AudioChunk, SharedSession, AUDIO_CHUNK_SIZE};

const INTERRUPTED_SUFFIX: &str = " ... [user interrupted assistant here]";

pub async fn run(
    mut user_input_rx: mpsc::Receiver<Option<String>>,
    audio_output_tx: mpsc::Sender<Option<AudioChunk>>,
    llm: &ModelRecord,
    tts: &ModelRecord,
    session: Arc<SharedSession>,
    http: reqwest::Client,
) {
    let mut conversation: Vec<ChatMessage> = Vec::new();

    loop {
        let Some(user_text) = user_input_rx.recv().await.flatten() else {
            let _ = audio_output_tx.send(None).await;
            break;
        };

        session.clear_interrupt();
        let processing_turn_id = session.turn();
        conversation.push(ChatMessage::User { content: user_text });

        let limited = limit_messages(conversation.clone(), llm.context_size);
        let post = ChatPost {
            model: llm.wire_model.clone(),
            messages: limited,
            modalities: vec![gateway_llm::Modality::Text],
            audio: None,
            stream: true,
            max_tokens: None,
            temperature: llm.sampling.temperature,
            top_p: llm.sampling.top_p,
        };
        let llm_stream = gateway_llm::stream_chat(http.clone(), llm.upstream_url.clone(), post);

        let tts_client = match TtsClient::connect(&tts.upstream_url).await {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "failed to connect to tts model for realtime turn");
                continue;
            }
        };
        let config = ChatSynthConfig {
            tts_model: tts.wire_model.clone(),
            voice: tts.sampling.voice.clone().unwrap_or_default(),
            speed: if tts.sampling.speed > 0.0 { tts.sampling.speed } else { 1.0 },
            tts_context_size: tts.context_size,
        };

        let items = chat_synth(llm_stream, tts_client, config);
        futures::pin_mut!(items);

        let mut full_response = String::new();
        let mut interrupted = false;

        while let Some(item) = items.next().await {
            if session.is_interrupted(processing_turn_id) {
                interrupted = true;
                break;
            }

            match item {
                StreamItem::Text(t) => full_response.push_str(&t),
                StreamItem::Audio(bytes) => {
                    for chunk in bytes.chunks(AUDIO_CHUNK_SIZE) {
                        let sent = audio_output_tx
                            .send(Some(AudioChunk { bytes: chunk.to_vec(), turn_id: processing_turn_id }))
                            .await;
                        if sent.is_err() {
                            return;
                        }
                    }
                }
            }
        }

        if interrupted {
            full_response.push_str(INTERRUPTED_SUFFIX);
        }
        conversation.push(ChatMessage::Assistant { content: full_response, reasoning_content: None });
    }
}
