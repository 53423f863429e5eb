//! Dashboard page handlers.
//!
//! `index` renders the store snapshot; `status_detail` probes the given
//! URL on demand and renders the full result.

use askama::Template;
use axum::extract::{Query, State};
use axum::response::Html;
use tracing::debug;

use crate::DashboardState;
use crate::badges::{BadgeError, UrlQuery};
use crate::views::*;

fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(tmpl.render().unwrap_or_else(|e| {
        format!("<pre>Template error: {e}</pre>")
    }))
}

// ── Dashboard ───────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    title: String,
    refresh_secs: u64,
    show_timing: bool,
    show_details: bool,
    rows: Vec<ServiceRow>,
    last_update: String,
}

/// GET /
pub async fn index(State(state): State<DashboardState>) -> Html<String> {
    let options = &state.options;
    let rows: Vec<ServiceRow> = state
        .store
        .snapshot_all()
        .await
        .iter()
        .map(|entry| ServiceRow::from_status(entry, options.status_text))
        .collect();

    render(IndexTemplate {
        title: options.title.clone(),
        refresh_secs: options.refresh_secs,
        show_timing: options.show_timing,
        show_details: options.show_details,
        rows,
        last_update: now_display(),
    })
}

// ── Status Detail ───────────────────────────────────────────────

#[derive(Template)]
#[template(path = "status.html")]
struct StatusTemplate {
    detail: DetailView,
}

/// GET /status?url=...
pub async fn status_detail(
    State(state): State<DashboardState>,
    Query(query): Query<UrlQuery>,
) -> Result<Html<String>, BadgeError> {
    let url = query.required()?;
    let result = state.prober.probe(&url).await;
    debug!(%url, status = %result.status_text(), "status detail");

    Ok(render(StatusTemplate {
        detail: DetailView::from_result(&url, &result),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use upwatch_health::{BoxFuture, Prober};
    use upwatch_state::{ProbeResult, StatusStore, StatusText, Target};

    struct FixedProber(ProbeResult);

    impl Prober for FixedProber {
        fn probe<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, ProbeResult> {
            let result = self.0.clone();
            Box::pin(async move { result })
        }
    }

    fn test_state(options: DisplayOptions) -> DashboardState {
        let store = StatusStore::new(vec![
            Target::new("https://a.example.com", "Alpha"),
            Target::new("https://b.example.com", "Beta <b>"),
        ]);
        DashboardState {
            store,
            prober: Arc::new(FixedProber(ProbeResult::success(
                200,
                "OK",
                42.0,
                None,
                vec![("server".to_string(), "test".to_string())],
            ))),
            options,
        }
    }

    #[tokio::test]
    async fn index_shows_pending_before_first_sweep() {
        let state = test_state(DisplayOptions::default());
        let Html(body) = index(State(state)).await;
        assert!(body.contains("Service Monitor"));
        assert_eq!(body.matches("Pending").count(), 2);
        assert!(body.contains("Beta &#60;b&#62;"));
        assert!(!body.contains("<b>"));
    }

    #[tokio::test]
    async fn index_renders_results_in_order() {
        let state = test_state(DisplayOptions::default());
        state
            .store
            .set(
                "https://b.example.com",
                ProbeResult::failure("connection failed: refused"),
            )
            .await;
        state
            .store
            .set(
                "https://a.example.com",
                ProbeResult::success(
                    301,
                    "Moved Permanently",
                    5.0,
                    Some("https://a.example.com/".to_string()),
                    Vec::new(),
                ),
            )
            .await;

        let Html(body) = index(State(state)).await;
        let a = body.find("https://a.example.com").unwrap();
        let b = body.find("https://b.example.com").unwrap();
        assert!(a < b);
        assert!(body.contains("301 Moved Permanently"));
        assert!(body.contains("5 ms"));
        assert!(body.contains("connection failed: refused"));
        assert!(!body.contains("Pending"));
    }

    #[tokio::test]
    async fn index_minimal_profile_hides_columns() {
        let options = DisplayOptions {
            status_text: StatusText::Short,
            show_timing: false,
            show_details: false,
            ..Default::default()
        };
        let state = test_state(options);
        state
            .store
            .set(
                "https://a.example.com",
                ProbeResult::success(
                    302,
                    "Found",
                    7.0,
                    Some("https://elsewhere.example.com/".to_string()),
                    Vec::new(),
                ),
            )
            .await;

        let Html(body) = index(State(state)).await;
        assert!(body.contains("3xx"));
        assert!(!body.contains("302 Found"));
        assert!(!body.contains("7 ms"));
        assert!(!body.contains("elsewhere.example.com"));
    }

    #[tokio::test]
    async fn status_detail_renders_probe() {
        let state = test_state(DisplayOptions::default());
        let Html(body) = status_detail(
            State(state),
            Query(UrlQuery {
                url: Some("https://c.example.com/x?y=1".to_string()),
            }),
        )
        .await
        .unwrap();
        assert!(body.contains("200 OK"));
        assert!(body.contains("42 ms"));
        assert!(body.contains("server"));
        assert!(body.contains("/svg?url=https%3A%2F%2Fc.example.com%2Fx%3Fy%3D1"));
        assert!(body.contains("/png?url=https%3A%2F%2Fc.example.com%2Fx%3Fy%3D1"));
    }

    #[tokio::test]
    async fn status_detail_requires_url() {
        let state = test_state(DisplayOptions::default());
        let err = status_detail(State(state), Query(UrlQuery::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, BadgeError::MissingUrl));
    }
}
