//! upwatch-state: shared state for the upwatch monitor.
//!
//! Holds the domain types (targets and probe results), the TOML
//! configuration, and the in-memory [`StatusStore`] that the sweep
//! scheduler writes and the HTTP handlers read.
//!
//! # Architecture
//!
//! The target set is fixed at startup and shared as `Arc<[Target]>`.
//! Each target's latest [`ProbeResult`] sits behind one `RwLock`, stored
//! as an `Arc` so a write replaces the whole record and readers never see
//! a mix of two probe attempts.
//!
//! The `StatusStore` is `Clone` + `Send` + `Sync` and can be shared across
//! async tasks.

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::{DashboardConfig, MonitorConfig, MonitorSettings, ServerConfig, StatusText};
pub use error::{ConfigError, ConfigResult};
pub use store::{StatusStore, TargetStatus};
pub use types::*;
