//! Per-model health worker: polls `ping` on a fast cadence and `request` once
//! ping succeeds, latching an error string only after a startup grace window.

use std::sync::Arc;
use std::time::Duration;

use gateway_core::{ModelKind, ModelRecord};
use gateway_llm::{ChatMessage, ChatPost};

const STARTUP_GRACE: Duration = Duration::from_secs(360);
const PING_TIMEOUT: Duration = Duration::from_secs(3);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const UNHEALTHY_DELAY: Duration = Duration::from_secs(5);
const HEALTHY_DELAY: Duration = Duration::from_secs(30);

/// Spawn one monitoring task per model in the registry. Tasks run for the
/// life of the process, updating each `ModelRecord`'s `Status` in place
/// through the shared `Arc`.
pub fn spawn_all(registry: Arc<Vec<ModelRecord>>, http: reqwest::Client) {
    for index in 0..registry.len() {
        tokio::spawn(monitor_single_model(registry.clone(), index, http.clone()));
    }
}

async fn monitor_single_model(registry: Arc<Vec<ModelRecord>>, index: usize, http: reqwest::Client) {
    let record = &registry[index];
    let kind = record.kind;
    let url = record.upstream_url.clone();
    let status = &record.status;
    let resolve_name = record.resolve_name.clone();

    let started_at = tokio::time::Instant::now();
    let mut request_checked = false;

    loop {
        let ping_ok = ping(kind, &url, &http).await;
        status.set_ping_ok(ping_ok);

        if ping_ok && !request_checked {
            let request_ok = request_check(kind, &url, &http).await;
            status.set_request_ok(request_ok);
            request_checked = request_ok;
        }

        let healthy = status.running();
        if !healthy && started_at.elapsed() >= STARTUP_GRACE {
            let reason = if !ping_ok {
                "ping check failing".to_string()
            } else {
                "request check failing".to_string()
            };
            status.set_error(Some(reason));
        } else if healthy {
            status.set_error(None);
        }

        tracing::debug!(model = %resolve_name, ping_ok, healthy, "health check tick");

        tokio::time::sleep(if healthy { HEALTHY_DELAY } else { UNHEALTHY_DELAY }).await;
    }
}

async fn ping(kind: ModelKind, url: &str, http: &reqwest::Client) -> bool {
    match kind {
        ModelKind::Llm => {
            let result = tokio::time::timeout(PING_TIMEOUT, http.get(url).send()).await;
            matches!(result, Ok(Ok(resp)) if resp.status().is_success())
        }
        ModelKind::Tts => {
            // `TtsClient::ping` already carries its own internal timeout.
            let result: Result<bool, gateway_grpc::GrpcError> = async {
                let mut client = gateway_grpc::TtsClient::connect(url).await?;
                client.ping().await
            }
            .await;
            matches!(result, Ok(true))
        }
        ModelKind::Stt => {
            let result =
                tokio::time::timeout(PING_TIMEOUT, gateway_grpc::SttClient::connect(url)).await;
            matches!(result, Ok(Ok(_)))
        }
    }
}

async fn request_check(kind: ModelKind, url: &str, http: &reqwest::Client) -> bool {
    match kind {
        ModelKind::Llm => {
            let post = ChatPost {
                model: "health-check".to_string(),
                messages: vec![ChatMessage::User { content: "Echo".to_string() }],
                modalities: vec![gateway_llm::Modality::Text],
                audio: None,
                stream: false,
                max_tokens: Some(10),
                temperature: None,
                top_p: None,
            };
            let result = tokio::time::timeout(REQUEST_TIMEOUT, http.post(url).json(&post).send()).await;
            matches!(result, Ok(Ok(resp)) if resp.status().is_success())
        }
        // The gRPC connection check already exercised the channel; a full
        // synthesis/transcription round-trip is too expensive to run every
        // health tick, so TTS/STT treat a successful ping as the request
        // check too (see DESIGN.md).
        ModelKind::Tts | ModelKind::Stt => true,
    }
}
