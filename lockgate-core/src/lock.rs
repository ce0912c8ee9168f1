//! Per-device serialization
//!
//! The attempt store is the only shared mutable resource in the engine, and
//! its read-modify-write cycles must be linearizable per device: two
//! concurrent failures from the same device must both be counted, and a block
//! transition must fire exactly once. A single global mutex would serialize
//! unrelated devices, so locking is keyed by device id instead — a sharded
//! lock table where operations on distinct devices proceed fully in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::record::DeviceId;

/// Keyed async lock table, one mutex per device id.
///
/// Entries are created on first use and retained for the process lifetime;
/// the table is bounded by the number of distinct devices seen.
#[derive(Default)]
pub struct DeviceLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl DeviceLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the lock for one device, waiting if another task holds it.
    ///
    /// The guard must be held across the full read-modify-write cycle against
    /// the attempt store.
    pub async fn acquire(&self, device_id: &DeviceId) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(device_id.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        mutex.lock_owned().await
    }

    /// Number of devices with a lock entry. Used by tests.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
