//! STT producer: decodes incoming WebSocket audio, feeds the upstream STT
//! bidi stream, and turns `SpeechTranscription` events into queued user text.

use std::sync::Arc;

use axum::extract::ws::Message;
use futures::stream::SplitStream;
use futures::StreamExt;
use gateway_core::ModelRecord;
use gateway_grpc::{SttClient, SttEvent};
use tokio::sync::mpsc;

use super::session::SharedSession;

pub async fn run(
    mut ws_receiver: SplitStream<axum::extract::ws::WebSocket>,
    stt: &ModelRecord,
    session: Arc<SharedSession>,
    user_input_tx: mpsc::Sender<Option<String>>,
) {
    let mut client = match SttClient::connect(&stt.upstream_url).await {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "failed to connect to stt model, ending realtime session");
            let _ = user_input_tx.send(None).await;
            return;
        }
    };

    let stt_session = match client.transcribe(&stt.wire_model).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "stt transcribe call failed, ending realtime session");
            let _ = user_input_tx.send(None).await;
            return;
        }
    };
    let (stt_sender, mut stt_events) = stt_session.split();

    let (decoder_in_tx, decoder_in_rx) = mpsc::channel::<Vec<u8>>(64);
    let (decoder_out_tx, mut decoder_out_rx) = mpsc::channel::<Vec<u8>>(64);
    let decoder = tokio::spawn(gateway_pipeline::run_decoder(
        stt.audio.sample_rate,
        stt.audio.channels,
        decoder_in_rx,
        decoder_out_tx,
    ));

    let forward_ws = async move {
        while let Some(message) = ws_receiver.next().await {
            match message {
                Ok(Message::Binary(bytes)) => {
                    if decoder_in_tx.send(bytes.to_vec()).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }
        // `decoder_in_tx` drops here, closing the decoder's stdin.
    };

    let forward_pcm = async {
        while let Some(pcm) = decoder_out_rx.recv().await {
            if stt_sender.send_audio(pcm).await.is_err() {
                break;
            }
        }
        // `stt_sender` drops here, closing the gRPC request stream so the
        // upstream model can flush its final transcription.
    };

    let forward_events = async {
        while let Some(event) = stt_events.recv().await {
            match event {
                Ok(SttEvent::Transcription { text, .. }) => {
                    session.begin_new_turn();
                    if user_input_tx.send(Some(text)).await.is_err() {
                        break;
                    }
                }
                Ok(SttEvent::SpeechStart { .. }) | Ok(SttEvent::SpeechStop { .. }) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "stt event stream error");
                    break;
                }
            }
        }
    };

    tokio::join!(forward_ws, forward_pcm, forward_events);

    decoder.abort();
    let _ = user_input_tx.send(None).await;
}
