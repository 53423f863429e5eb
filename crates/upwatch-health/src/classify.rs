//! Status classification.
//!
//! Maps a probe outcome to a severity class and a short display label.
//! Total over every integer status code; anything outside the 2xx, 3xx,
//! and 4xx ranges lands in the server-error bucket.

use serde::Serialize;

use upwatch_state::{Outcome, ProbeResult};

/// Severity bucket for a probe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusClass {
    Ok,
    Redirect,
    ClientError,
    /// 5xx, and every code below 200 or above 599.
    ServerError,
    /// No response at all.
    Error,
    /// Not probed yet.
    Pending,
}

impl StatusClass {
    /// CSS class / API name.
    pub fn as_str(self) -> &'static str {
        match self {
            StatusClass::Ok => "ok",
            StatusClass::Redirect => "redirect",
            StatusClass::ClientError => "client-error",
            StatusClass::ServerError => "server-error",
            StatusClass::Error => "error",
            StatusClass::Pending => "pending",
        }
    }

    /// Foreground color used by the dashboard and both badge formats.
    pub fn color(self) -> &'static str {
        match self {
            StatusClass::Ok => "#00b700",
            StatusClass::Redirect => "#ff8000",
            StatusClass::ClientError => "#000000",
            StatusClass::ServerError | StatusClass::Error => "#ff0c0c",
            StatusClass::Pending => "#666666",
        }
    }

    /// `color()` as RGB.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            StatusClass::Ok => [0x00, 0xb7, 0x00],
            StatusClass::Redirect => [0xff, 0x80, 0x00],
            StatusClass::ClientError => [0x00, 0x00, 0x00],
            StatusClass::ServerError | StatusClass::Error => [0xff, 0x0c, 0x0c],
            StatusClass::Pending => [0x66, 0x66, 0x66],
        }
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Class plus the short label shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub class: StatusClass,
    pub label: String,
}

/// Classify a raw status code. Defined for every `i64`.
pub fn classify_code(code: i64) -> Classification {
    let (class, label) = match code {
        200..=299 => (StatusClass::Ok, code.to_string()),
        300..=399 => (StatusClass::Redirect, "3xx".to_string()),
        400..=499 => (StatusClass::ClientError, "4xx".to_string()),
        _ => (StatusClass::ServerError, "5xx".to_string()),
    };
    Classification { class, label }
}

/// Classify a probe outcome.
pub fn classify(outcome: &Outcome) -> Classification {
    match outcome {
        Outcome::Success { status_code, .. } => classify_code(i64::from(*status_code)),
        Outcome::Failure { .. } => Classification {
            class: StatusClass::Error,
            label: "Error".to_string(),
        },
    }
}

/// Classify a store entry, where `None` means "not probed yet".
pub fn classify_status(result: Option<&ProbeResult>) -> Classification {
    match result {
        Some(r) => classify(&r.outcome),
        None => Classification {
            class: StatusClass::Pending,
            label: "Pending".to_string(),
        },
    }
}
