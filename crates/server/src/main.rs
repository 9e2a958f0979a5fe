use std::sync::Arc;

use gateway_server::{health, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (server_config, registry) = match gateway_config::load() {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!(error = %e, "failed to load gateway configuration");
            std::process::exit(1);
        }
    };

    let state = AppState::new(registry);
    health::spawn_all(Arc::clone(&state.registry), state.http.clone());

    let router = gateway_server::build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], server_config.listen_port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind listen address");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "gateway listening");
    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}
