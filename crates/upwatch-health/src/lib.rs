//! upwatch-health: probing, classification, and periodic sweeps.
//!
//! # Architecture
//!
//! ```text
//! SweepScheduler
//!   ├── Bootstrapping: one full sweep at startup
//!   ├── Steady: a full sweep every `interval`
//!   │   ├── Prober::probe(url) → ProbeResult   (bounded concurrency)
//!   │   └── StatusStore::set(url, result)      (as each probe lands)
//!   └── shutdown via watch channel
//!
//! classify(&Outcome) → Classification   (pure, used at render time)
//! ```
//!
//! Probes never fail: every transport problem becomes an
//! `Outcome::Failure` carrying a short message.

pub mod checker;
pub mod classify;
pub mod monitor;

pub use checker::{BoxFuture, HttpProber, ProbeError, Prober, DEFAULT_TIMEOUT};
pub use classify::{classify, classify_code, classify_status, Classification, StatusClass};
pub use monitor::{SchedulerPhase, SweepReport, SweepScheduler};
