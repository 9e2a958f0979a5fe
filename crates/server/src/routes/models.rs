//! `GET /v0/models` (gateway-native, with health status) and
//! `GET /oai/v1/models` (OpenAI-compatible, running models only).

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use gateway_core::StatusSnapshot;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ModelEntry {
    pub id: String,
    pub object: &'static str,
    pub kind: gateway_core::ModelKind,
    pub status: StatusSnapshot,
}

#[derive(Serialize)]
pub struct ModelsResponse {
    pub object: &'static str,
    pub data: Vec<ModelEntry>,
}

/// Full registry view, including models that are still failing health checks.
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let data = state
        .registry
        .iter()
        .map(|record| ModelEntry {
            id: record.resolve_name.clone(),
            object: "model",
            kind: record.kind,
            status: StatusSnapshot::from(&record.status),
        })
        .collect();

    Json(ModelsResponse { object: "list", data })
}

#[derive(Serialize)]
pub struct OaiModelEntry {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub owned_by: &'static str,
}

#[derive(Serialize)]
pub struct OaiModelsResponse {
    pub object: &'static str,
    pub data: Vec<OaiModelEntry>,
}

/// OpenAI-compatible subset: only models whose health checks currently pass.
pub async fn list_oai_models(State(state): State<AppState>) -> Json<OaiModelsResponse> {
    let data = state
        .registry
        .iter()
        .filter(|record| record.status.running())
        .map(|record| OaiModelEntry {
            id: record.resolve_name.clone(),
            object: "model",
            created: 0,
            owned_by: "gateway",
        })
        .collect();

    Json(OaiModelsResponse { object: "list", data })
}
