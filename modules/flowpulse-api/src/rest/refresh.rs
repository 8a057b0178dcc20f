// Refresh trigger and its single-flight guard.
//
// The pipeline runs in a dedicated thread with its own runtime, decoupled
// from the request that triggered it. The caller gets an immediate
// acknowledgement; the only ways to observe completion are the status
// endpoint and the snapshot itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

use flowpulse_collect::pipeline::Pipeline;
use flowpulse_collect::profile;
use flowpulse_common::Config;

use crate::AppState;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RefreshStatus {
    pub last_run_id: Option<Uuid>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Serializes refreshes: at most one pipeline run per process at a time.
pub struct RefreshState {
    in_flight: AtomicBool,
    status: Mutex<RefreshStatus>,
}

impl RefreshState {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            status: Mutex::new(RefreshStatus::default()),
        }
    }

    /// Take the guard. Returns false if a refresh is already in flight.
    pub fn try_begin(&self, run_id: Uuid) -> bool {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.lock_status().last_run_id = Some(run_id);
        true
    }

    pub fn finish_success(&self) {
        {
            let mut status = self.lock_status();
            status.last_success = Some(Utc::now());
            status.last_error = None;
        }
        self.in_flight.store(false, Ordering::Release);
    }

    pub fn finish_error(&self, error: String) {
        self.lock_status().last_error = Some(error);
        self.in_flight.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn status(&self) -> RefreshStatus {
        self.lock_status().clone()
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, RefreshStatus> {
        self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RefreshState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the full pipeline in a dedicated thread. Returns immediately; the
/// guard must already be held and is released on completion either way.
/// Failures are logged only — the previous snapshot stays in place and the
/// triggering caller never hears about them.
pub fn spawn_refresh(config: Config, state: Arc<RefreshState>, run_id: Uuid) {
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
        rt.block_on(async move {
            info!(%run_id, "Refresh run starting");
            let pipeline = Pipeline::from_config(&config, profile::default_profile());
            match pipeline.run().await {
                Ok(stats) => {
                    info!(%run_id, records = stats.records_total, "Refresh run complete");
                    state.finish_success();
                }
                Err(e) => {
                    error!(%run_id, error = %e, "Refresh run failed, previous snapshot retained");
                    state.finish_error(e.to_string());
                }
            }
        });
    });
}

// --- HTTP handlers ---

pub async fn api_refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let run_id = Uuid::new_v4();

    if !state.refresh.try_begin(run_id) {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "refresh already in progress"})),
        )
            .into_response();
    }

    spawn_refresh(state.config.clone(), state.refresh.clone(), run_id);

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"status": "started", "run_id": run_id})),
    )
        .into_response()
}

pub async fn api_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.refresh.status();
    Json(serde_json::json!({
        "state": if state.refresh.is_running() { "running" } else { "idle" },
        "last_run_id": status.last_run_id,
        "last_success": status.last_success,
        "last_error": status.last_error,
    }))
}
