pub mod refresh;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::warn;

use flowpulse_common::FlowPulseError;

use crate::AppState;

/// The persisted snapshot, verbatim: a JSON array of scored records sorted
/// descending by score.
pub async fn api_records(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.load().await {
        Ok(records) => Json(records).into_response(),
        Err(FlowPulseError::SnapshotMissing) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "Dataset not found. Trigger a refresh to generate it."
            })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to read snapshot");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to read snapshot"})),
            )
                .into_response()
        }
    }
}
