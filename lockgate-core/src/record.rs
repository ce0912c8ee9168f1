//! Per-device attempt records
//!
//! This module contains the core attempt record struct and the device
//! identifier it is keyed by.
//!
//! One record exists per device fingerprint. It carries two independent
//! tracks: registration attempts (gated by a hard ceiling and an
//! administrator-reviewed unblock workflow) and login attempts (gated by an
//! escalating timed lockout). The record is created on first contact from a
//! device and is never hard-deleted by the engine, so blocked devices keep an
//! audit trail.
//!
//! | Field                     | Type                       | Description                                            |
//! | ------------------------- | -------------------------- | ------------------------------------------------------ |
//! | `device_id`               | `DeviceId`                 | Unique key for the record.                             |
//! | `registration_attempts`   | `u32`                      | Registration attempts observed for this device.        |
//! | `last_attempt_at`         | `Option<DateTime>`         | Timestamp of the latest registration attempt.          |
//! | `is_blocked`              | `bool`                     | Registration-track block flag.                         |
//! | `blocked_at`              | `Option<DateTime>`         | When the registration block was imposed.               |
//! | `block_reason`            | `Option<String>`           | Why; rejection reasons are appended, never overwritten.|
//! | `unblock_request_sent`    | `bool`                     | An unblock request is awaiting review.                 |
//! | `unblock_request_message` | `Option<String>`           | Message supplied by the requester.                     |
//! | `login_attempts`          | `u32`                      | Cumulative failed logins since the last success.       |
//! | `last_login_attempt_at`   | `Option<DateTime>`         | Timestamp of the latest failed login.                  |
//! | `login_block_level`       | `LoginBlockLevel`          | Current escalation tier for the login track.           |
//! | `login_block_expires_at`  | `Option<DateTime>`         | When the current login block lapses.                   |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::LoginBlockLevel;

/// A unique, stable identifier for a physical device.
///
/// Derived from client-observable signals by the fingerprint module, or
/// supplied directly by callers that track devices some other way. This value
/// should be treated as opaque. It is a rate-limiting key, not a credential:
/// the signals it is derived from are client-reported and spoofable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct DeviceId(String);

/// Identifier used when no fingerprint signals were available.
///
/// All signal-less clients collapse onto this one id, so none of the
/// per-device tracking guarantees hold for it. Callers should check
/// [`DeviceId::is_fallback`] and treat such devices as unknown.
pub const FALLBACK_DEVICE_ID: &str = "dev_unknown";

impl DeviceId {
    pub fn new(id: &str) -> Self {
        DeviceId(id.to_string())
    }

    /// The shared identifier for devices that presented no signals.
    pub fn fallback() -> Self {
        DeviceId(FALLBACK_DEVICE_ID.to_string())
    }

    /// Whether this is the shared fallback id rather than a real fingerprint.
    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_DEVICE_ID
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Durable per-device counters and block state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub device_id: DeviceId,

    pub registration_attempts: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub is_blocked: bool,
    pub blocked_at: Option<DateTime<Utc>>,
    pub block_reason: Option<String>,

    pub unblock_request_sent: bool,
    pub unblock_request_message: Option<String>,

    pub login_attempts: u32,
    pub last_login_attempt_at: Option<DateTime<Utc>>,
    pub login_block_level: LoginBlockLevel,
    pub login_block_expires_at: Option<DateTime<Utc>>,
}

impl AttemptRecord {
    /// A fresh record with zero counters, as created on first contact.
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            registration_attempts: 0,
            last_attempt_at: None,
            is_blocked: false,
            blocked_at: None,
            block_reason: None,
            unblock_request_sent: false,
            unblock_request_message: None,
            login_attempts: 0,
            last_login_attempt_at: None,
            login_block_level: LoginBlockLevel::None,
            login_block_expires_at: None,
        }
    }

    /// Whether the login block has an active (unexpired) timer at `now`.
    ///
    /// A stored level whose timer has lapsed is logically expired even before
    /// any caller resets it; readers apply this lazily instead of relying on
    /// a background job.
    pub fn login_block_active(&self, now: DateTime<Utc>) -> bool {
        self.login_block_level != LoginBlockLevel::None
            && self.login_block_expires_at.is_some_and(|expires| expires > now)
    }
}
