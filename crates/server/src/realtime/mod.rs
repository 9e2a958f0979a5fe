//! `WS /oai/v1/realtime?model=llm+tts+stt`: the realtime voice loop. Three
//! concurrent tasks share one turn-tracking state; whichever finishes first
//! tears the session down.

mod llm_tts_producer;
mod session;
mod stt_producer;
mod ws_sender;

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde::Deserialize;

use gateway_core::{GatewayError, ModelRecord, ResolvedModelSet};

use crate::state::AppState;
use session::SharedSession;

#[derive(Debug, Deserialize)]
pub struct RealtimeQuery {
    pub model: String,
}

pub async fn realtime(
    ws: WebSocketUpgrade,
    Query(query): Query<RealtimeQuery>,
    State(state): State<AppState>,
) -> Result<Response, GatewayError> {
    // Resolved eagerly so a bad `model` string fails the upgrade with a JSON
    // error rather than opening a socket that closes immediately.
    let resolved = ResolvedModelSet::resolve(&query.model, &state.registry)?;
    resolved.require_llm()?;
    if resolved.tts.is_none() || resolved.stt.is_none() {
        return Err(GatewayError::Validation(
            "realtime requires a 'llm+tts+stt' model triple".to_string(),
        ));
    }

    let names = ResolvedNames {
        llm: resolved.llm.unwrap().resolve_name.clone(),
        tts: resolved.tts.unwrap().resolve_name.clone(),
        stt: resolved.stt.unwrap().resolve_name.clone(),
    };

    Ok(ws.on_upgrade(move |socket| run_session(socket, names, state.registry.clone(), state.http.clone())))
}

struct ResolvedNames {
    llm: String,
    tts: String,
    stt: String,
}

fn find<'a>(registry: &'a [ModelRecord], name: &str) -> &'a ModelRecord {
    registry.iter().find(|r| r.resolve_name == name).expect("resolved before websocket upgrade")
}

async fn run_session(
    socket: axum::extract::ws::WebSocket,
    names: ResolvedNames,
    registry: Arc<Vec<ModelRecord>>,
    http: reqwest::Client,
) {
    let (ws_sink, ws_stream) = socket.split();
    let session = SharedSession::new();

    let (user_input_tx, user_input_rx) = tokio::sync::mpsc::channel(32);
    let (audio_output_tx, audio_output_rx) = tokio::sync::mpsc::channel(256);

    let stt_registry = registry.clone();
    let stt_name = names.stt.clone();
    let stt_session = session.clone();
    let stt_task = tokio::spawn(async move {
        let stt = find(&stt_registry, &stt_name);
        stt_producer::run(ws_stream, stt, stt_session, user_input_tx).await;
    });

    let llm_registry = registry.clone();
    let llm_name = names.llm.clone();
    let tts_name = names.tts.clone();
    let llm_session = session.clone();
    let llm_task = tokio::spawn(async move {
        let llm = find(&llm_registry, &llm_name);
        let tts = find(&llm_registry, &tts_name);
        llm_tts_producer::run(user_input_rx, audio_output_tx, llm, tts, llm_session, http).await;
    });

    let sender_session = session.clone();
    let sender_task = tokio::spawn(ws_sender::run(ws_sink, audio_output_rx, sender_session));

    // First task to finish wins; the other two are aborted and awaited
    // rather than just dropped, so ffmpeg children and gRPC streams they
    // own get torn down before we return.
    tokio::select! {
        _ = &mut stt_task => {},
        _ = &mut llm_task => {},
        _ = &mut sender_task => {},
    }

    for task in [stt_task, llm_task, sender_task] {
        if !task.is_finished() {
            task.abort();
        }
        let _ = task.await;
    }

    tracing::debug!(model = %names.llm, "realtime session ended");
}
