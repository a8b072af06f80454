use axum::{routing::get, Router};
use std::path::Path;
use talkwave_core::config::BrokerConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::ws_handler;
use crate::state::BrokerState;

/// `/ws` for clients, static assets for everything else
pub fn router(state: BrokerState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown_rx` fires
pub async fn run_server(
    state: BrokerState,
    listener: TcpListener,
    static_dir: impl AsRef<Path>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let app = router(state, static_dir);

    tracing::info!("Broker listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            tracing::info!("Broker shutting down signal received");
        })
        .await?;

    Ok(())
}

/// Bind `host:port` from the config and serve
pub async fn serve(
    config: &BrokerConfig,
    state: BrokerState,
    shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    run_server(state, listener, &config.static_dir, shutdown_rx).await
}
