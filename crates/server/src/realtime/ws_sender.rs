//! WS sender: paces outbound audio chunks and drops anything tagged with a
//! stale turn id.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::stream::SplitSink;
use futures::SinkExt;
use tokio::sync::mpsc;

use super::session::{AudioChunk, SharedSession, BYTES_PER_SECOND};

pub async fn run(
    mut ws_sender: SplitSink<axum::extract::ws::WebSocket, Message>,
    mut audio_output_rx: mpsc::Receiver<Option<AudioChunk>>,
    session: Arc<SharedSession>,
) {
    while let Some(item) = audio_output_rx.recv().await {
        let Some(chunk) = item else { break };

        if chunk.turn_id != session.turn() {
            continue;
        }

        let len = chunk.bytes.len();
        if ws_sender.send(Message::Binary(chunk.bytes)).await.is_err() {
            break;
        }

        let pace = Duration::from_secs_f64(len as f64 / BYTES_PER_SECOND as f64);
        tokio::time::sleep(pace).await;
    }

    let _ = ws_sender.close().await;
}
