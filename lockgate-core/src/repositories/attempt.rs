//! Repository trait for attempt records.
//!
//! This module defines the storage interface for per-device attempt records.
//! The engine is storage-agnostic: anything that can look up, create, and
//! persist an [`AttemptRecord`] keyed by device id can back it.

use async_trait::async_trait;

use crate::{Error, record::AttemptRecord, record::DeviceId};

/// Repository for per-device attempt records.
///
/// # Concurrency
///
/// Implementations are not required to serialize read-modify-write cycles
/// themselves; the service layer holds a per-device lock across each cycle.
/// `find_or_create` must still be safe under concurrent calls for the same
/// device id (e.g. an insert that ignores conflicts), because first contact
/// can race before any lock entry exists in another process.
///
/// # Failure
///
/// Transient I/O failures surface as [`StorageError`](crate::error::StorageError);
/// the engine performs no retries, leaving retry policy to the storage client.
#[async_trait]
pub trait AttemptRepository: Send + Sync + 'static {
    /// Look up the record for a device, `None` if the device has never been
    /// seen.
    async fn find(&self, device_id: &DeviceId) -> Result<Option<AttemptRecord>, Error>;

    /// Look up the record for a device, creating a zero-counter record on
    /// first contact. Creation is idempotent.
    async fn find_or_create(&self, device_id: &DeviceId) -> Result<AttemptRecord, Error>;

    /// Persist the full state of a record, replacing the stored version.
    ///
    /// Records are never hard-deleted: blocks are lifted by explicit
    /// administrator action mutating the record, preserving the audit trail.
    async fn update(&self, record: &AttemptRecord) -> Result<AttemptRecord, Error>;
}
