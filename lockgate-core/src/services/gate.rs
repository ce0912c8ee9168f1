//! Access gate service.
//!
//! The façade the authentication flow calls before acting: it reads the
//! current attempt record and turns it into a structured allow/deny verdict.
//! The gate never caches records across calls; every decision re-reads the
//! store so it cannot act on stale block state.
//!
//! Deny verdicts carry structured metadata (reason, expiry, remaining
//! minutes) rather than encoding it in a message string a caller would have
//! to parse back apart.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    lock::DeviceLocks,
    policy::{LoginBlockLevel, REGISTRATION_BLOCK_REASON},
    record::DeviceId,
    repositories::AttemptRepository,
    validation::validate_device_id,
};

/// Verdict for a registration check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationDecision {
    Allow,
    Deny {
        /// Human-readable block reason.
        reason: String,
        /// Whether an unblock request is already awaiting review. When
        /// false, the caller may offer the submit flow.
        unblock_request_sent: bool,
    },
}

impl RegistrationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RegistrationDecision::Allow)
    }
}

/// Verdict for a login check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginDecision {
    Allow,
    Deny {
        /// Human-readable block reason.
        reason: String,
        /// When the block lapses. Propagate unmodified so the caller can
        /// render a countdown without re-querying.
        expires_at: DateTime<Utc>,
        /// Whole minutes until `expires_at`, rounded up.
        remaining_minutes: i64,
    },
}

impl LoginDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LoginDecision::Allow)
    }
}

/// Read-then-decide façade over the attempt store.
///
/// The corresponding mutations (`record_*` on the tracker) happen afterward,
/// driven by the outcome of the guarded operation.
pub struct AccessGateService<R: AttemptRepository> {
    repository: Arc<R>,
    locks: Arc<DeviceLocks>,
}

impl<R: AttemptRepository> AccessGateService<R> {
    pub fn new(repository: Arc<R>, locks: Arc<DeviceLocks>) -> Self {
        Self { repository, locks }
    }

    /// Decide whether a device may register a new account.
    ///
    /// Devices with no attempt record are allowed; the record is created by
    /// the tracker when the attempt itself is recorded.
    pub async fn check_registration(
        &self,
        device_id: &DeviceId,
    ) -> Result<RegistrationDecision, Error> {
        validate_device_id(device_id)?;

        let Some(record) = self.repository.find(device_id).await? else {
            return Ok(RegistrationDecision::Allow);
        };

        if !record.is_blocked {
            return Ok(RegistrationDecision::Allow);
        }

        Ok(RegistrationDecision::Deny {
            reason: record
                .block_reason
                .unwrap_or_else(|| REGISTRATION_BLOCK_REASON.to_string()),
            unblock_request_sent: record.unblock_request_sent,
        })
    }

    /// Decide whether a device may proceed to credential verification.
    ///
    /// Applies lazy expiry at read time: a stored block level whose timer has
    /// lapsed is reset in the store and the call returns Allow. The
    /// cumulative failure counter is left untouched, so repeated offenders
    /// keep escalating across episodes.
    pub async fn check_login(&self, device_id: &DeviceId) -> Result<LoginDecision, Error> {
        validate_device_id(device_id)?;

        let Some(record) = self.repository.find(device_id).await? else {
            return Ok(LoginDecision::Allow);
        };

        let now = Utc::now();
        if record.login_block_level != LoginBlockLevel::None
            && let Some(expires_at) = record.login_block_expires_at.filter(|expires| *expires > now)
        {
            let remaining_seconds = (expires_at - now).num_seconds().max(0);
            let remaining_minutes = (remaining_seconds as u64).div_ceil(60) as i64;

            return Ok(LoginDecision::Deny {
                reason: format!(
                    "Too many failed login attempts. Try again in {remaining_minutes} minute(s)"
                ),
                expires_at,
                remaining_minutes,
            });
        }

        if record.login_block_level != LoginBlockLevel::None {
            self.reset_expired_block(device_id).await?;
        }

        Ok(LoginDecision::Allow)
    }

    // Clears a lapsed block level under the device lock, re-reading first so
    // a concurrent escalation is never clobbered.
    async fn reset_expired_block(&self, device_id: &DeviceId) -> Result<(), Error> {
        let _guard = self.locks.acquire(device_id).await;

        let Some(mut record) = self.repository.find(device_id).await? else {
            return Ok(());
        };

        let now = Utc::now();
        if record.login_block_level != LoginBlockLevel::None && !record.login_block_active(now) {
            record.login_block_level = LoginBlockLevel::None;
            record.login_block_expires_at = None;
            self.repository.update(&record).await?;

            tracing::debug!(device_id = %device_id, "Cleared expired login block");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::LockoutConfig;
    use crate::repositories::memory::InMemoryAttemptRepository;
    use crate::services::tracker::AttemptTrackerService;
    use chrono::Duration;

    struct Fixture {
        repository: Arc<InMemoryAttemptRepository>,
        tracker: AttemptTrackerService<InMemoryAttemptRepository>,
        gate: AccessGateService<InMemoryAttemptRepository>,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(InMemoryAttemptRepository::new());
        let locks = Arc::new(DeviceLocks::new());
        Fixture {
            repository: Arc::clone(&repository),
            tracker: AttemptTrackerService::new(
                Arc::clone(&repository),
                Arc::clone(&locks),
                LockoutConfig::default(),
            ),
            gate: AccessGateService::new(repository, locks),
        }
    }

    #[tokio::test]
    async fn test_unknown_device_is_allowed() {
        let fixture = fixture();
        let device = DeviceId::new("dev_new");

        assert!(fixture
            .gate
            .check_registration(&device)
            .await
            .unwrap()
            .is_allowed());
        assert!(fixture.gate.check_login(&device).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_registration_denied_past_ceiling() {
        let fixture = fixture();
        let device = DeviceId::new("dev_abc");

        for _ in 0..6 {
            fixture
                .tracker
                .record_registration_attempt(&device)
                .await
                .unwrap();
        }

        let decision = fixture.gate.check_registration(&device).await.unwrap();
        match decision {
            RegistrationDecision::Deny {
                reason,
                unblock_request_sent,
            } => {
                assert_eq!(reason, REGISTRATION_BLOCK_REASON);
                assert!(!unblock_request_sent);
            }
            RegistrationDecision::Allow => panic!("expected deny"),
        }
    }

    #[tokio::test]
    async fn test_login_denied_with_structured_metadata() {
        let fixture = fixture();
        let device = DeviceId::new("dev_abc");

        for _ in 0..3 {
            fixture.tracker.record_login_attempt(&device).await.unwrap();
        }

        let decision = fixture.gate.check_login(&device).await.unwrap();
        match decision {
            LoginDecision::Deny {
                expires_at,
                remaining_minutes,
                reason,
            } => {
                assert!(expires_at > Utc::now());
                assert!((1..=5).contains(&remaining_minutes));
                assert!(reason.contains("failed login attempts"));
            }
            LoginDecision::Allow => panic!("expected deny"),
        }
    }

    #[tokio::test]
    async fn test_lazy_expiry_allows_and_keeps_counter() {
        let fixture = fixture();
        let device = DeviceId::new("dev_abc");

        for _ in 0..3 {
            fixture.tracker.record_login_attempt(&device).await.unwrap();
        }

        let mut aged = fixture.repository.find(&device).await.unwrap().unwrap();
        aged.login_block_expires_at = Some(Utc::now() - Duration::seconds(1));
        fixture.repository.update(&aged).await.unwrap();

        let decision = fixture.gate.check_login(&device).await.unwrap();
        assert!(decision.is_allowed());

        // The level was reset in the store but the cumulative counter stands.
        let record = fixture.repository.find(&device).await.unwrap().unwrap();
        assert_eq!(record.login_block_level, LoginBlockLevel::None);
        assert!(record.login_block_expires_at.is_none());
        assert_eq!(record.login_attempts, 3);
    }

    #[tokio::test]
    async fn test_gate_rereads_store_each_call() {
        let fixture = fixture();
        let device = DeviceId::new("dev_abc");

        assert!(fixture.gate.check_login(&device).await.unwrap().is_allowed());

        for _ in 0..6 {
            fixture.tracker.record_login_attempt(&device).await.unwrap();
        }

        // The block imposed after the first check is visible immediately.
        assert!(!fixture.gate.check_login(&device).await.unwrap().is_allowed());
    }
}
