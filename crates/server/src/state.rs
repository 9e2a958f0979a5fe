use std::sync::Arc;

use gateway_core::ModelRecord;

/// Process-wide shared state: the immutable model registry and the HTTP
/// client pool used for all upstream LLM calls.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Vec<ModelRecord>>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(registry: Vec<ModelRecord>) -> Self {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("reqwest client builds");

        Self { registry: Arc::new(registry), http }
    }
}
