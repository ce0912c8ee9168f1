//! Unblock request workflow.
//!
//! The human-review escape hatch for registration blocks. A blocked device
//! submits one request at a time (`NONE → REQUESTED`); an administrator
//! resolves it (`REQUESTED → APPROVED | REJECTED`). Approval reopens the
//! device for registration with fresh counters; rejection keeps the block and
//! appends the rejection reason to the audit trail, after which the device
//! may submit again.
//!
//! `submit` is end-user-invoked; `approve` and `reject` are
//! administrator-invoked. Authenticating the administrator is the caller's
//! concern, not this service's.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    Error,
    error::StateError,
    lock::DeviceLocks,
    record::{AttemptRecord, DeviceId},
    repositories::AttemptRepository,
    validation::{validate_device_id, validate_unblock_message},
};

/// Service driving unblock request state transitions.
///
/// All transitions serialize through the shared [`DeviceLocks`] table so a
/// resolution can never interleave with a concurrent attempt mutation on the
/// same record.
pub struct UnblockService<R: AttemptRepository> {
    repository: Arc<R>,
    locks: Arc<DeviceLocks>,
}

impl<R: AttemptRepository> UnblockService<R> {
    pub fn new(repository: Arc<R>, locks: Arc<DeviceLocks>) -> Self {
        Self { repository, locks }
    }

    /// Submit an unblock request for a blocked device.
    ///
    /// Valid only when the device is registration-blocked and no request is
    /// already pending. The message is re-validated here regardless of what
    /// the submitting endpoint checked.
    ///
    /// # Errors
    ///
    /// - [`ValidationError`](crate::error::ValidationError) for an empty
    ///   device id or a message outside the 30-500 character bounds
    /// - [`Error::NotFound`] when the device has no attempt record
    /// - [`StateError::NotBlocked`] when the device is not blocked
    /// - [`StateError::RequestAlreadyPending`] when a request awaits review
    pub async fn submit(&self, device_id: &DeviceId, message: &str) -> Result<AttemptRecord, Error> {
        validate_device_id(device_id)?;
        validate_unblock_message(message)?;

        let _guard = self.locks.acquire(device_id).await;

        let mut record = self.load(device_id).await?;

        if !record.is_blocked {
            return Err(StateError::NotBlocked.into());
        }
        if record.unblock_request_sent {
            return Err(StateError::RequestAlreadyPending.into());
        }

        record.unblock_request_sent = true;
        record.unblock_request_message = Some(message.to_string());

        tracing::info!(device_id = %device_id, "Unblock request submitted");

        self.repository.update(&record).await
    }

    /// Approve a pending unblock request.
    ///
    /// Clears the block and the pending request, and resets the registration
    /// counter to zero so the device may register fresh.
    pub async fn approve(&self, device_id: &DeviceId) -> Result<AttemptRecord, Error> {
        validate_device_id(device_id)?;

        let _guard = self.locks.acquire(device_id).await;

        let mut record = self.load(device_id).await?;
        if !record.unblock_request_sent {
            return Err(StateError::NoPendingRequest.into());
        }

        record.is_blocked = false;
        record.blocked_at = None;
        record.block_reason = None;
        record.registration_attempts = 0;
        record.unblock_request_sent = false;
        record.unblock_request_message = None;

        tracing::info!(device_id = %device_id, "Unblock request approved");

        self.repository.update(&record).await
    }

    /// Reject a pending unblock request.
    ///
    /// The device stays blocked. The rejection reason is appended to the
    /// stored block reason — the original reason is never overwritten — and
    /// the pending flag is cleared so the device may submit a new request
    /// later.
    pub async fn reject(
        &self,
        device_id: &DeviceId,
        rejection_reason: &str,
    ) -> Result<AttemptRecord, Error> {
        validate_device_id(device_id)?;

        let _guard = self.locks.acquire(device_id).await;

        let mut record = self.load(device_id).await?;
        if !record.unblock_request_sent {
            return Err(StateError::NoPendingRequest.into());
        }

        let rejected_at = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        record.block_reason = Some(match record.block_reason {
            Some(existing) => format!("{existing}; Rejected {rejected_at}: {rejection_reason}"),
            None => format!("Rejected {rejected_at}: {rejection_reason}"),
        });
        record.unblock_request_sent = false;
        record.unblock_request_message = None;

        tracing::info!(device_id = %device_id, "Unblock request rejected");

        self.repository.update(&record).await
    }

    async fn load(&self, device_id: &DeviceId) -> Result<AttemptRecord, Error> {
        self.repository
            .find(device_id)
            .await?
            .ok_or_else(|| Error::NotFound(device_id.to_string()))
    }
}
