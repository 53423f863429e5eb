//! JSON API handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use upwatch_health::{SchedulerPhase, StatusClass, classify_status};
use upwatch_state::ProbeResult;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
        })
    }
}

/// One target in `/api/v1/status`.
#[derive(Debug, Serialize)]
pub struct StatusEntry {
    pub url: String,
    pub name: String,
    pub class: StatusClass,
    pub label: String,
    /// `null` while the target is pending.
    pub result: Option<ProbeResult>,
}

/// GET /api/v1/status
pub async fn list_status(State(state): State<ApiState>) -> impl IntoResponse {
    let entries: Vec<StatusEntry> = state
        .store
        .snapshot_all()
        .await
        .into_iter()
        .map(|entry| {
            let c = classify_status(entry.result.as_deref());
            StatusEntry {
                url: entry.target.url,
                name: entry.target.name,
                class: c.class,
                label: c.label,
                result: entry.result.as_deref().cloned(),
            }
        })
        .collect();
    ApiResponse::ok(entries)
}

/// GET /healthz
pub async fn healthz(State(state): State<ApiState>) -> impl IntoResponse {
    match *state.phase.borrow() {
        SchedulerPhase::Steady => (StatusCode::OK, "ok"),
        SchedulerPhase::Bootstrapping => (StatusCode::SERVICE_UNAVAILABLE, "bootstrapping"),
    }
}
