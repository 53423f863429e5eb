//! upwatch-dashboard: server-rendered status UI and badges.
//!
//! # Routes
//!
//! | Route | Handler |
//! |---|---|
//! | `/` | Dashboard: every configured target from the status store |
//! | `/status?url=` | Detail page for a fresh probe of `url` |
//! | `/svg?url=` | SVG badge for a fresh probe of `url` |
//! | `/png?url=` | PNG badge for a fresh probe of `url` |
//!
//! Only `/` reads the status store. The other three call the prober
//! directly and share nothing between requests.

pub mod badges;
pub mod pages;
pub mod png;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use upwatch_health::Prober;
use upwatch_state::StatusStore;

pub use views::DisplayOptions;

/// Shared state for dashboard handlers.
#[derive(Clone)]
pub struct DashboardState {
    pub store: StatusStore,
    pub prober: Arc<dyn Prober>,
    pub options: DisplayOptions,
}

/// Build the dashboard router.
pub fn dashboard_router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/status", get(pages::status_detail))
        .route("/svg", get(badges::svg_badge))
        .route("/png", get(badges::png_badge))
        .with_state(state)
}
