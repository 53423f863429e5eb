//! StatusStore: latest probe result per target, shared between the
//! sweep scheduler and the HTTP handlers.
//!
//! One writer (the scheduler) and any number of readers. Each entry is an
//! `Arc<ProbeResult>` swapped in under a write lock, so a reader holds
//! either the old record or the new one, never a blend of both.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{ProbeResult, Target};

/// A configured target paired with its latest result.
///
/// `result` is `None` until the first probe of this target completes
/// (rendered as "Pending").
#[derive(Debug, Clone)]
pub struct TargetStatus {
    pub target: Target,
    pub result: Option<Arc<ProbeResult>>,
}

impl TargetStatus {
    pub fn is_pending(&self) -> bool {
        self.result.is_none()
    }
}

/// Thread-safe latest-result cache keyed by target URL.
#[derive(Clone)]
pub struct StatusStore {
    /// Configured targets in declaration order. Fixed for the process lifetime.
    targets: Arc<[Target]>,
    entries: Arc<RwLock<HashMap<String, Arc<ProbeResult>>>>,
}

impl StatusStore {
    /// Create an empty store for the given target set.
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            targets: targets.into(),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The configured targets, in declaration order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Replace the entry for `identity`.
    pub async fn set(&self, identity: &str, result: ProbeResult) {
        let result = Arc::new(result);
        let mut entries = self.entries.write().await;
        entries.insert(identity.to_string(), result);
        debug!(%identity, "status updated");
    }

    /// Latest result for `identity`, or `None` if it was never probed.
    pub async fn get(&self, identity: &str) -> Option<Arc<ProbeResult>> {
        let entries = self.entries.read().await;
        entries.get(identity).cloned()
    }

    /// Every configured target with its latest result, in declaration order.
    ///
    /// Each entry is a consistent record; different entries may come from
    /// different sweeps.
    pub async fn snapshot_all(&self) -> Vec<TargetStatus> {
        let entries = self.entries.read().await;
        self.targets
            .iter()
            .map(|target| TargetStatus {
                target: target.clone(),
                result: entries.get(target.identity()).cloned(),
            })
            .collect()
    }

    /// Number of targets that have at least one result.
    pub async fn probed_count(&self) -> usize {
        let entries = self.entries.read().await;
        self.targets
            .iter()
            .filter(|t| entries.contains_key(t.identity()))
            .count()
    }
}
