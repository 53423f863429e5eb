//! upwatch.toml configuration.
//!
//! Everything except `[[targets]]` is optional. [`MonitorConfig::from_file`]
//! parses and validates in one step so a bad target list stops the daemon
//! before any task starts.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Target;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub targets: Vec<Target>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub status_text: StatusText,
    #[serde(default = "default_true")]
    pub show_timing: bool,
    #[serde(default = "default_true")]
    pub show_details: bool,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

/// Which status text the dashboard shows per row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusText {
    /// Code and reason phrase, e.g. `404 Not Found`.
    #[default]
    Full,
    /// Classifier label, e.g. `4xx`.
    Short,
}

fn default_interval_secs() -> u64 {
    60
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_concurrency() -> usize {
    8
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_title() -> String {
    "Service Monitor".to_string()
}

fn default_refresh_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            status_text: StatusText::default(),
            show_timing: true,
            show_details: true,
            refresh_secs: default_refresh_secs(),
        }
    }
}

impl MonitorSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MonitorConfig {
    /// Read, parse, and validate a config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate config text.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: MonitorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.targets.is_empty() {
            return Err(ConfigError::Invalid("no targets configured".to_string()));
        }
        if self.monitor.interval_secs == 0 {
            return Err(ConfigError::Invalid("monitor.interval_secs must be > 0".to_string()));
        }
        if self.monitor.timeout_secs == 0 {
            return Err(ConfigError::Invalid("monitor.timeout_secs must be > 0".to_string()));
        }
        if self.monitor.max_concurrency == 0 {
            return Err(ConfigError::Invalid("monitor.max_concurrency must be > 0".to_string()));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            validate_url(&target.url)?;
            if !seen.insert(target.url.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate target url: {}", target.url)));
            }
        }
        Ok(())
    }
}

/// Accept only absolute `http`/`https` URLs with a host.
pub fn validate_url(url: &str) -> ConfigResult<()> {
    let uri: http::Uri = url
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("{url}: {e}")))?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        Some(other) => {
            return Err(ConfigError::Invalid(format!("{url}: unsupported scheme {other}")));
        }
        None => return Err(ConfigError::Invalid(format!("{url}: missing scheme"))),
    }
    if uri.host().is_none_or(str::is_empty) {
        return Err(ConfigError::Invalid(format!("{url}: missing host")));
    }
    Ok(())
}
