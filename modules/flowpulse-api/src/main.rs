use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flowpulse_collect::snapshot::SnapshotStore;
use flowpulse_common::Config;

mod rest;

use rest::refresh::RefreshState;

pub struct AppState {
    pub store: SnapshotStore,
    pub refresh: Arc<RefreshState>,
    pub config: Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("flowpulse=info".parse()?))
        .init();

    let config = Config::from_env();
    config.log_redacted();

    let state = Arc::new(AppState {
        store: SnapshotStore::new(&config.snapshot_path),
        refresh: Arc::new(RefreshState::new()),
        config: config.clone(),
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // REST API
        .route("/api/records", get(rest::api_records))
        .route("/api/refresh", post(rest::refresh::api_refresh))
        .route("/api/status", get(rest::refresh::api_status))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("FlowPulse API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
