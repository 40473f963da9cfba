// ==============================================================================
// locks.rs - Per-Session Reassembly Locks
// ==============================================================================
// Description: At most one reassembly in flight per upload identifier
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Held for the whole list, order, stream and delete sequence
#[derive(Debug)]
pub struct ReassemblyGuard {
    identifier: String,
    _guard: OwnedMutexGuard<()>,
}

impl ReassemblyGuard {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Async mutexes keyed by identifier
#[derive(Debug, Default, Clone)]
pub struct ReassemblyLocks {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl ReassemblyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive reassembly rights on `identifier`
    pub async fn acquire(&self, identifier: &str) -> ReassemblyGuard {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            // Entries only referenced by the map are idle
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);

            locks
                .entry(identifier.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        ReassemblyGuard {
            identifier: identifier.to_string(),
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of identifiers with a lock held or awaited
    pub fn active(&self) -> usize {
        let locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.values().filter(|lock| Arc::strong_count(lock) > 1).count()
    }
}
