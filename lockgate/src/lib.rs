//! # Lockgate
//!
//! Lockgate binds user accounts to a single physical device and throttles
//! both device-registration attempts and login attempts with a progressive
//! lockout policy, plus a human-review escape hatch (unblock requests) for
//! devices that exceed the registration ceiling.
//!
//! The engine tracks two independent per-device attempt tracks:
//!
//! - **Registration**: a hard ceiling (5 attempts by default). Exceeding it
//!   blocks the device until an administrator approves an unblock request.
//! - **Login**: an escalating timed lockout driven by cumulative failures —
//!   3 failures lock for 5 minutes, 5 for 15 minutes, 6 or more for 24 hours.
//!   A successful login resets the counter; an expired timer only resets the
//!   level, so repeat offenders escalate faster.
//!
//! Device identity comes from a fingerprint over client-reported environment
//! signals. This is a rate-limiting heuristic, not an authentication factor:
//! the signals are spoofable and the derived id must never be treated as a
//! credential.
//!
//! ## Storage Support
//!
//! Lockgate currently supports the following storage backends:
//! - SQLite (`lockgate-storage-sqlite`)
//! - In-memory (bundled, for tests and single-process deployments)
//!
//! ## Example
//!
//! ```rust,no_run
//! use lockgate::{Lockgate, DeviceSignals, SqliteRepositoryProvider};
//! use lockgate_core::repositories::RepositoryProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
//!     let repositories = Arc::new(SqliteRepositoryProvider::new(pool));
//!     repositories.migrate().await.unwrap();
//!
//!     let lockgate = Lockgate::new(repositories);
//!
//!     let device_id = DeviceSignals::default().fingerprint();
//!     let decision = lockgate.check_registration(&device_id).await.unwrap();
//!     println!("Decision: {decision:?}");
//! }
//! ```

use std::sync::Arc;

use lockgate_core::{
    lock::DeviceLocks,
    repositories::{AttemptRepositoryAdapter, RepositoryProvider},
    services::{AccessGateService, AttemptTrackerService, UnblockService},
};

/// Re-export core types from lockgate_core
///
/// These types are commonly used when working with the Lockgate API.
pub use lockgate_core::{
    AttemptRecord, DeviceId, DeviceSignals, Error, LockoutConfig, LoginBlockLevel,
    error::{StateError, StorageError, ValidationError},
    services::{LoginDecision, RegistrationDecision},
};

/// Re-export storage backends
///
/// These storage implementations are available when the corresponding feature
/// is enabled.
#[cfg(feature = "sqlite")]
pub use lockgate_storage_sqlite::SqliteRepositoryProvider;

pub use lockgate_core::repositories::InMemoryRepositoryProvider;

/// The main access-control coordinator that manages services and storage.
///
/// `Lockgate` wires the attempt tracker, the access gate, and the unblock
/// workflow over one repository provider and one shared per-device lock
/// table, and exposes them as a single API.
///
/// # Example
///
/// ```rust,no_run
/// use lockgate::{Lockgate, DeviceId, InMemoryRepositoryProvider};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let lockgate = Lockgate::new(Arc::new(InMemoryRepositoryProvider::new()));
///
///     let device_id = DeviceId::new("dev_example");
///     if lockgate.check_login(&device_id).await?.is_allowed() {
///         // ... verify credentials, then:
///         lockgate.record_login_success(&device_id).await?;
///     }
///     Ok(())
/// }
/// ```
pub struct Lockgate<R: RepositoryProvider> {
    repositories: Arc<R>,
    tracker: AttemptTrackerService<AttemptRepositoryAdapter<R>>,
    gate: AccessGateService<AttemptRepositoryAdapter<R>>,
    unblock: UnblockService<AttemptRepositoryAdapter<R>>,
    attempts: Arc<AttemptRepositoryAdapter<R>>,
}

impl<R: RepositoryProvider> Lockgate<R> {
    /// Create a new Lockgate instance with the default lockout policy.
    pub fn new(repositories: Arc<R>) -> Self {
        Self::with_config(repositories, LockoutConfig::default())
    }

    /// Create a new Lockgate instance with a custom lockout policy.
    pub fn with_config(repositories: Arc<R>, config: LockoutConfig) -> Self {
        let attempts = Arc::new(AttemptRepositoryAdapter::new(repositories.clone()));
        let locks = Arc::new(DeviceLocks::new());

        Self {
            repositories,
            tracker: AttemptTrackerService::new(attempts.clone(), locks.clone(), config),
            gate: AccessGateService::new(attempts.clone(), locks.clone()),
            unblock: UnblockService::new(attempts.clone(), locks),
            attempts,
        }
    }

    /// The active lockout policy.
    pub fn config(&self) -> &LockoutConfig {
        self.tracker.config()
    }

    /// Check whether the underlying storage is reachable.
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    // ------------------------------------------------------------------
    // Access gate (read-then-decide; call before the guarded operation)
    // ------------------------------------------------------------------

    /// Decide whether a device may register a new account.
    pub async fn check_registration(
        &self,
        device_id: &DeviceId,
    ) -> Result<RegistrationDecision, Error> {
        self.gate.check_registration(device_id).await
    }

    /// Decide whether a device may proceed to credential verification.
    ///
    /// Deny verdicts carry the block expiry and remaining minutes so the
    /// caller can render a countdown without re-querying.
    pub async fn check_login(&self, device_id: &DeviceId) -> Result<LoginDecision, Error> {
        self.gate.check_login(device_id).await
    }

    // ------------------------------------------------------------------
    // Attempt tracking (call after the guarded operation's outcome)
    // ------------------------------------------------------------------

    /// Record one registration attempt for a device.
    pub async fn record_registration_attempt(
        &self,
        device_id: &DeviceId,
    ) -> Result<AttemptRecord, Error> {
        self.tracker.record_registration_attempt(device_id).await
    }

    /// Record one failed login attempt for a device.
    pub async fn record_login_failure(&self, device_id: &DeviceId) -> Result<AttemptRecord, Error> {
        self.tracker.record_login_attempt(device_id).await
    }

    /// Reset the login track after a successful authentication.
    pub async fn record_login_success(&self, device_id: &DeviceId) -> Result<AttemptRecord, Error> {
        self.tracker.record_login_success(device_id).await
    }

    // ------------------------------------------------------------------
    // Unblock workflow
    // ------------------------------------------------------------------

    /// Submit an unblock request for a blocked device (end-user-invoked).
    pub async fn submit_unblock_request(
        &self,
        device_id: &DeviceId,
        message: &str,
    ) -> Result<AttemptRecord, Error> {
        self.unblock.submit(device_id, message).await
    }

    /// Approve a pending unblock request (administrator-invoked).
    pub async fn approve_unblock_request(
        &self,
        device_id: &DeviceId,
    ) -> Result<AttemptRecord, Error> {
        self.unblock.approve(device_id).await
    }

    /// Reject a pending unblock request (administrator-invoked).
    pub async fn reject_unblock_request(
        &self,
        device_id: &DeviceId,
        rejection_reason: &str,
    ) -> Result<AttemptRecord, Error> {
        self.unblock.reject(device_id, rejection_reason).await
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Fetch the attempt record for a device, `None` if never seen.
    pub async fn get_attempt_record(
        &self,
        device_id: &DeviceId,
    ) -> Result<Option<AttemptRecord>, Error> {
        use lockgate_core::repositories::AttemptRepository;
        self.attempts.find(device_id).await
    }
}
