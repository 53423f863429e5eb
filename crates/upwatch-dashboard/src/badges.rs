//! On-demand badge handlers.
//!
//! `/svg` and `/png` probe the caller-supplied URL directly, outside the
//! status store and the sweep cadence, and return a color-coded image.

use askama::Template;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::DashboardState;
use crate::png::render_png;
use crate::views::BadgeView;

/// `?url=` query for the probe-on-demand endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct UrlQuery {
    pub url: Option<String>,
}

impl UrlQuery {
    /// The `url` parameter, rejecting absent or blank values.
    pub fn required(self) -> Result<String, BadgeError> {
        self.url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or(BadgeError::MissingUrl)
    }
}

#[derive(Debug, Error)]
pub enum BadgeError {
    #[error("URL parameter is required")]
    MissingUrl,

    #[error("failed to render: {0}")]
    Render(String),
}

impl IntoResponse for BadgeError {
    fn into_response(self) -> Response {
        let status = match self {
            BadgeError::MissingUrl => StatusCode::BAD_REQUEST,
            BadgeError::Render(_) => {
                error!(error = %self, "badge rendering failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Template)]
#[template(path = "badge.svg", escape = "html")]
struct SvgBadgeTemplate<'a> {
    text: &'a str,
    color: &'a str,
}

/// Render an SVG badge document.
pub fn render_svg(badge: &BadgeView) -> Result<String, BadgeError> {
    SvgBadgeTemplate {
        text: &badge.text,
        color: badge.class.color(),
    }
    .render()
    .map_err(|e| BadgeError::Render(e.to_string()))
}

/// GET /svg?url=...
pub async fn svg_badge(
    State(state): State<DashboardState>,
    Query(query): Query<UrlQuery>,
) -> Result<Response, BadgeError> {
    let url = query.required()?;
    let result = state.prober.probe(&url).await;
    let badge = BadgeView::from_result(&result);
    debug!(%url, text = %badge.text, "svg badge");

    let body = render_svg(&badge)?;
    Ok((
        [(CONTENT_TYPE, "image/svg+xml"), (CACHE_CONTROL, "no-cache")],
        body,
    )
        .into_response())
}

/// GET /png?url=...
pub async fn png_badge(
    State(state): State<DashboardState>,
    Query(query): Query<UrlQuery>,
) -> Result<Response, BadgeError> {
    let url = query.required()?;
    let result = state.prober.probe(&url).await;
    let badge = BadgeView::from_result(&result);
    debug!(%url, text = %badge.text, "png badge");

    let body = render_png(&badge.text, badge.class.rgb())
        .map_err(|e| BadgeError::Render(e.to_string()))?;
    Ok((
        [(CONTENT_TYPE, "image/png"), (CACHE_CONTROL, "no-cache")],
        body,
    )
        .into_response())
}
