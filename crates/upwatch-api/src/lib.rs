//! upwatch-api: HTTP surface for upwatch.
//!
//! Mounts the dashboard and badge routes at the root and adds a small
//! JSON API.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/status` | Latest result for every configured target |
//! | GET | `/healthz` | 200 once the first sweep finished, 503 before |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::sync::watch;
use upwatch_dashboard::{DashboardState, DisplayOptions};
use upwatch_health::{Prober, SchedulerPhase};
use upwatch_state::StatusStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: StatusStore,
    pub phase: watch::Receiver<SchedulerPhase>,
}

/// Build the complete router (dashboard + badges + JSON API).
pub fn build_router(
    store: StatusStore,
    prober: Arc<dyn Prober>,
    options: DisplayOptions,
    phase: watch::Receiver<SchedulerPhase>,
) -> Router {
    let api_state = ApiState {
        store: store.clone(),
        phase,
    };

    let dashboard_state = DashboardState {
        store,
        prober,
        options,
    };

    let api_routes = Router::new()
        .route("/status", get(handlers::list_status))
        .with_state(api_state.clone());

    upwatch_dashboard::dashboard_router(dashboard_state)
        .nest("/api/v1", api_routes)
        .route("/healthz", get(handlers::healthz).with_state(api_state))
}
