//! View types for dashboard template rendering.
//!
//! Purpose-built for Askama templates: they carry pre-formatted strings
//! and computed fields so templates stay simple.

use chrono::Local;

use upwatch_health::{Classification, StatusClass, classify, classify_status};
use upwatch_state::{DashboardConfig, ProbeResult, StatusText, TIMESTAMP_FORMAT, TargetStatus};

/// Which fields the dashboard renders.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub title: String,
    pub status_text: StatusText,
    pub show_timing: bool,
    pub show_details: bool,
    pub refresh_secs: u64,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for DisplayOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            title: config.title.clone(),
            status_text: config.status_text,
            show_timing: config.show_timing,
            show_details: config.show_details,
            refresh_secs: config.refresh_secs,
        }
    }
}

// ── Dashboard row ───────────────────────────────────────────────

pub struct ServiceRow {
    pub url: String,
    pub name: String,
    pub class: &'static str,
    pub color: &'static str,
    pub status: String,
    pub elapsed: Option<String>,
    pub last_check: String,
    pub redirect: Option<String>,
    pub error: Option<String>,
}

impl ServiceRow {
    pub fn from_status(entry: &TargetStatus, text: StatusText) -> Self {
        let result = entry.result.as_deref();
        let Classification { class, label } = classify_status(result);

        let status = match (result, text) {
            (Some(r), StatusText::Full) => r.status_text(),
            _ => label,
        };

        Self {
            url: entry.target.url.clone(),
            name: entry.target.name.clone(),
            class: class.as_str(),
            color: class.color(),
            status,
            elapsed: result.and_then(|r| r.elapsed_ms).map(format_ms),
            last_check: result
                .map(ProbeResult::observed_at_display)
                .unwrap_or_else(|| "N/A".to_string()),
            redirect: result.and_then(|r| r.redirect_location.clone()),
            error: result.and_then(|r| r.error()).map(str::to_string),
        }
    }
}

// ── Status detail ───────────────────────────────────────────────

pub struct DetailView {
    pub url: String,
    pub class: &'static str,
    pub color: &'static str,
    pub status: String,
    pub elapsed: String,
    pub last_check: String,
    pub redirect: Option<String>,
    pub error: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl DetailView {
    pub fn from_result(url: &str, result: &ProbeResult) -> Self {
        let class = classify(&result.outcome).class;
        Self {
            url: url.to_string(),
            class: class.as_str(),
            color: class.color(),
            status: result.status_text(),
            elapsed: result
                .elapsed_ms
                .map(|ms| format!("{} ms", format_ms(ms)))
                .unwrap_or_else(|| "-".to_string()),
            last_check: result.observed_at_display(),
            redirect: result.redirect_location.clone(),
            error: result.error().map(str::to_string),
            headers: result.headers.clone(),
        }
    }
}

// ── Badge ───────────────────────────────────────────────────────

/// Text and color for an SVG or PNG badge.
pub struct BadgeView {
    pub text: String,
    pub class: StatusClass,
}

impl BadgeView {
    pub fn from_result(result: &ProbeResult) -> Self {
        Self {
            text: result.status_text(),
            class: classify(&result.outcome).class,
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────

/// `42.0` → `"42"`, `12.34` → `"12.34"`.
pub fn format_ms(ms: f64) -> String {
    let s = format!("{ms:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn now_display() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
