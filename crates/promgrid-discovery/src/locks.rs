//! Per-exporter mutation locks.
//!
//! A mutation must hold its exporter's lock across the store write and the
//! file write together, so the last file write for an exporter always
//! corresponds to the last store write. Different exporters never share a
//! lock and proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Hands out one async mutex per exporter.
///
/// Locks are created lazily on first use and live for the process lifetime;
/// the set of exporters is small and operator-curated.
#[derive(Clone, Default)]
pub struct ExporterLocks {
    locks: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ExporterLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the mutation lock for one exporter.
    pub async fn acquire(&self, exporter: &str) -> OwnedMutexGuard<()> {
        let existing = self.locks.read().await.get(exporter).cloned();
        let lock = match existing {
            Some(lock) => lock,
            None => {
                let mut locks = self.locks.write().await;
                locks.entry(exporter.to_string()).or_default().clone()
            }
        };
        lock.lock_owned().await
    }
}
