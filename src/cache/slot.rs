use std::sync::{
    Arc, RwLock, RwLockReadGuard, RwLockWriteGuard,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::application::error::Cancelled;

/// Holds the published snapshot of one cache plus its population gate.
///
/// The snapshot pointer is only locked long enough to clone or swap the `Arc`.
/// The gate is an async mutex so the populating task may hold it across I/O.
pub(crate) struct SnapshotSlot<T> {
    target: &'static str,
    current: RwLock<Option<Arc<T>>>,
    generation: AtomicU64,
    gate: Mutex<()>,
}

impl<T> SnapshotSlot<T> {
    pub(crate) fn new(target: &'static str) -> Self {
        Self {
            target,
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
            gate: Mutex::new(()),
        }
    }

    pub(crate) fn load(&self) -> Option<Arc<T>> {
        self.read("load").clone()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Publish `snapshot` unless the slot was cleared after `generation` was read.
    pub(crate) fn publish(&self, snapshot: Arc<T>, generation: u64) -> bool {
        let mut current = self.write("publish");
        if self.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        *current = Some(snapshot);
        true
    }

    pub(crate) fn clear(&self) {
        let mut current = self.write("clear");
        self.generation.fetch_add(1, Ordering::AcqRel);
        *current = None;
    }

    /// Wait for the population gate, giving up when `cancel` fires first.
    pub(crate) async fn enter(
        &self,
        cancel: &CancellationToken,
    ) -> Result<MutexGuard<'_, ()>, Cancelled> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Cancelled),
            guard = self.gate.lock() => Ok(guard),
        }
    }

    fn read(&self, op: &'static str) -> RwLockReadGuard<'_, Option<Arc<T>>> {
        self.current.read().unwrap_or_else(|poisoned| {
            warn!(
                op,
                target_module = self.target,
                lock_kind = "rwlock.read",
                result = "poisoned_recovered",
                "Recovered from poisoned snapshot lock"
            );
            poisoned.into_inner()
        })
    }

    fn write(&self, op: &'static str) -> RwLockWriteGuard<'_, Option<Arc<T>>> {
        self.current.write().unwrap_or_else(|poisoned| {
            warn!(
                op,
                target_module = self.target,
                lock_kind = "rwlock.write",
                result = "poisoned_recovered",
                "Recovered from poisoned snapshot lock"
            );
            poisoned.into_inner()
        })
    }
}
