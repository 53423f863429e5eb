//! Domain types for the upwatch monitor.
//!
//! A [`Target`] is one configured endpoint. A [`ProbeResult`] is the
//! immutable record of one probe attempt against it.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Display format for observation timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Target ─────────────────────────────────────────────────────────

/// A monitored endpoint.
///
/// `url` is both the probe address and the status store key, so it must
/// be unique across the configured set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Target {
    pub url: String,
    /// Free-form label, informational only.
    #[serde(default)]
    pub name: String,
}

impl Target {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }

    /// Status store key for this target.
    pub fn identity(&self) -> &str {
        &self.url
    }
}

// ── Probe result ───────────────────────────────────────────────────

/// What a single probe attempt produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The server answered with a status line.
    Success { status_code: u16, reason: String },
    /// No response: timeout, refused connection, DNS or TLS failure.
    Failure { error: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Outcome::Success { status_code, .. } => Some(*status_code),
            Outcome::Failure { .. } => None,
        }
    }
}

/// The outcome of one probe attempt against a target.
///
/// Built once through [`ProbeResult::success`] or [`ProbeResult::failure`]
/// and never mutated; the store replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeResult {
    pub outcome: Outcome,
    /// Wall-clock request time in milliseconds. `Some` only on success.
    pub elapsed_ms: Option<f64>,
    /// `Location` header value, when the response carried one.
    pub redirect_location: Option<String>,
    /// Response headers as name/value pairs. Empty on failure.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// When this attempt completed.
    pub observed_at: DateTime<Utc>,
}

impl ProbeResult {
    /// A response was received.
    pub fn success(
        status_code: u16,
        reason: impl Into<String>,
        elapsed_ms: f64,
        redirect_location: Option<String>,
        headers: Vec<(String, String)>,
    ) -> Self {
        Self {
            outcome: Outcome::Success {
                status_code,
                reason: reason.into(),
            },
            elapsed_ms: Some(round_ms(elapsed_ms.max(0.0))),
            redirect_location,
            headers,
            observed_at: Utc::now(),
        }
    }

    /// The request never produced a response.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failure {
                error: error.into(),
            },
            elapsed_ms: None,
            redirect_location: None,
            headers: Vec::new(),
            observed_at: Utc::now(),
        }
    }

    /// Override the observation time (for tests and replays).
    pub fn observed_at(mut self, at: DateTime<Utc>) -> Self {
        self.observed_at = at;
        self
    }

    /// Full status line: `"302 Found"` on success, `"Error"` on failure.
    pub fn status_text(&self) -> String {
        match &self.outcome {
            Outcome::Success {
                status_code,
                reason,
            } if reason.is_empty() => status_code.to_string(),
            Outcome::Success {
                status_code,
                reason,
            } => format!("{status_code} {reason}"),
            Outcome::Failure { .. } => "Error".to_string(),
        }
    }

    /// Failure message, if this attempt failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failure { error } => Some(error),
            Outcome::Success { .. } => None,
        }
    }

    /// `observed_at` in local time, formatted for display.
    pub fn observed_at_display(&self) -> String {
        self.observed_at
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }
}

/// Round to two decimal places.
fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}
