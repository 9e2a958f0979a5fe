//! HTTP/WebSocket surface for the inference gateway: route wiring, the
//! realtime voice loop, and the per-model health worker.

pub mod health;
pub mod realtime;
pub mod routes;
pub mod state;

pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v0/models", get(routes::models::list_models))
        .route("/oai/v1/models", get(routes::models::list_oai_models))
        .route("/oai/v1/chat/completions", post(routes::chat_completions::chat_completions))
        .route("/oai/v1/audio/speech", post(routes::audio_speech::audio_speech))
        .route("/oai/v1/audio/transcriptions", post(routes::audio_transcriptions::audio_transcriptions))
        .route("/oai/v1/realtime", get(realtime::realtime))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(60)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
