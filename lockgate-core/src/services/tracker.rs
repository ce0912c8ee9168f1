//! Attempt tracking service.
//!
//! Orchestrates record lookup, policy evaluation, and record mutation for
//! every registration or login event. Each call is one read-modify-write
//! cycle against the attempt store, serialized per device id through the
//! shared [`DeviceLocks`] table so concurrent attempts from the same device
//! never lose increments or double-trigger a block transition.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    Error,
    lock::DeviceLocks,
    policy::{self, LockoutConfig, LoginBlockLevel},
    record::{AttemptRecord, DeviceId},
    repositories::AttemptRepository,
    validation::validate_device_id,
};

/// Service tracking per-device registration and login attempts.
///
/// # Thread Safety
///
/// The service is thread-safe and intended to be shared across tasks.
/// Operations on distinct devices proceed in parallel; operations on the same
/// device are serialized.
pub struct AttemptTrackerService<R: AttemptRepository> {
    repository: Arc<R>,
    locks: Arc<DeviceLocks>,
    config: LockoutConfig,
}

impl<R: AttemptRepository> AttemptTrackerService<R> {
    /// Create a new tracker over the given repository and lock table.
    ///
    /// The lock table must be the same instance shared with every other
    /// service mutating attempt records, or per-device serialization breaks.
    pub fn new(repository: Arc<R>, locks: Arc<DeviceLocks>, config: LockoutConfig) -> Self {
        Self {
            repository,
            locks,
            config,
        }
    }

    pub fn config(&self) -> &LockoutConfig {
        &self.config
    }

    /// Record one registration attempt for a device.
    ///
    /// Increments the registration counter, stamps the attempt time, and
    /// applies the registration ceiling. On the unblocked-to-blocked
    /// transition, `blocked_at` and `block_reason` are set exactly once;
    /// attempts against an already blocked device keep counting without
    /// touching them.
    pub async fn record_registration_attempt(
        &self,
        device_id: &DeviceId,
    ) -> Result<AttemptRecord, Error> {
        validate_device_id(device_id)?;
        self.warn_on_fallback(device_id);

        let _guard = self.locks.acquire(device_id).await;

        let mut record = self.repository.find_or_create(device_id).await?;
        let now = Utc::now();

        record.registration_attempts += 1;
        record.last_attempt_at = Some(now);

        if !record.is_blocked
            && let Some(reason) = policy::registration_block(record.registration_attempts, &self.config)
        {
            record.is_blocked = true;
            record.blocked_at = Some(now);
            record.block_reason = Some(reason.to_string());

            tracing::info!(
                device_id = %device_id,
                attempts = record.registration_attempts,
                "Device blocked for registration"
            );
        }

        self.repository.update(&record).await
    }

    /// Record one failed login attempt for a device.
    ///
    /// Increments the cumulative failure counter and escalates the block
    /// level per the lockout table. Lazy expiry is applied first: a lapsed
    /// timer clears the stored level but not the counter, so the next
    /// failure re-enters at whatever tier the cumulative count maps to.
    /// Within an episode the level only moves up; re-entering the current
    /// tier does not extend a running timer.
    pub async fn record_login_attempt(&self, device_id: &DeviceId) -> Result<AttemptRecord, Error> {
        validate_device_id(device_id)?;
        self.warn_on_fallback(device_id);

        let _guard = self.locks.acquire(device_id).await;

        let mut record = self.repository.find_or_create(device_id).await?;
        let now = Utc::now();

        record.login_attempts += 1;
        record.last_login_attempt_at = Some(now);

        if record.login_block_level != LoginBlockLevel::None && !record.login_block_active(now) {
            record.login_block_level = LoginBlockLevel::None;
            record.login_block_expires_at = None;
        }

        let level = policy::login_level(record.login_attempts, &self.config);
        if level > record.login_block_level {
            record.login_block_level = level;
            record.login_block_expires_at =
                level.duration(&self.config).map(|duration| now + duration);

            tracing::info!(
                device_id = %device_id,
                attempts = record.login_attempts,
                level = level.as_u8(),
                "Login block level escalated"
            );
        }

        self.repository.update(&record).await
    }

    /// Reset the login track after a successful authentication.
    ///
    /// Clears the cumulative failure counter, the block level, and the
    /// expiry. The registration track is untouched.
    pub async fn record_login_success(&self, device_id: &DeviceId) -> Result<AttemptRecord, Error> {
        validate_device_id(device_id)?;

        let _guard = self.locks.acquire(device_id).await;

        let mut record = self.repository.find_or_create(device_id).await?;
        record.login_attempts = 0;
        record.login_block_level = LoginBlockLevel::None;
        record.login_block_expires_at = None;

        self.repository.update(&record).await
    }

    fn warn_on_fallback(&self, device_id: &DeviceId) {
        if device_id.is_fallback() {
            tracing::warn!(
                "Tracking attempt under the fallback device id; per-device guarantees do not hold"
            );
        }
    }
}
