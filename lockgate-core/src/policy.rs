//! Progressive lockout policy
//!
//! Pure decision tables mapping attempt counts to block outcomes. The policy
//! holds no state of its own: the tracker service feeds it counters from the
//! attempt record and applies whatever it decides.
//!
//! Two independent tracks are covered:
//!
//! - **Registration**: a hard ceiling on registration attempts per device.
//!   Exceeding it blocks the device until an administrator approves an
//!   unblock request.
//! - **Login**: an escalating timed lockout driven by the *cumulative* failed
//!   attempt count. The counter resets only on a successful login, so a
//!   device that has been locked out before re-enters at a higher tier on its
//!   next failure. Repeated offenders escalate faster.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Reason recorded when a device exceeds the registration ceiling.
pub const REGISTRATION_BLOCK_REASON: &str = "Exceeded maximum registration attempts";

/// Configuration for the lockout policy.
///
/// Defaults match the shipped policy: 5 registration attempts, login tiers at
/// 3 failures (5 minutes), 5 failures (15 minutes), and 6 failures (24 hours).
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    /// Registration attempts allowed before the device is blocked.
    /// The block triggers when the counter *exceeds* this value.
    pub registration_max_attempts: u32,

    /// Cumulative failed logins at which the first timed block starts.
    pub login_level_one_threshold: u32,
    /// Cumulative failed logins at which the second tier starts.
    pub login_level_two_threshold: u32,
    /// Cumulative failed logins at which the final tier starts.
    pub login_level_three_threshold: u32,

    /// Duration of a level-one login block.
    pub level_one_duration: Duration,
    /// Duration of a level-two login block.
    pub level_two_duration: Duration,
    /// Duration of a level-three login block.
    pub level_three_duration: Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            registration_max_attempts: 5,
            login_level_one_threshold: 3,
            login_level_two_threshold: 5,
            login_level_three_threshold: 6,
            level_one_duration: Duration::minutes(5),
            level_two_duration: Duration::minutes(15),
            level_three_duration: Duration::hours(24),
        }
    }
}

/// Escalation tier for the login track.
///
/// Levels are ordered: within a lockout episode the stored level only moves
/// up. It drops back to `None` on a successful login or when the block timer
/// lapses (lazy expiry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoginBlockLevel {
    /// No active block.
    None,
    /// First tier, a short cool-down.
    FiveMinutes,
    /// Second tier.
    FifteenMinutes,
    /// Final tier.
    TwentyFourHours,
}

impl LoginBlockLevel {
    /// Duration of the block at this level, `None` for the unblocked level.
    pub fn duration(&self, config: &LockoutConfig) -> Option<Duration> {
        match self {
            LoginBlockLevel::None => None,
            LoginBlockLevel::FiveMinutes => Some(config.level_one_duration),
            LoginBlockLevel::FifteenMinutes => Some(config.level_two_duration),
            LoginBlockLevel::TwentyFourHours => Some(config.level_three_duration),
        }
    }

    /// Numeric form used by storage backends (0 through 3).
    pub fn as_u8(&self) -> u8 {
        match self {
            LoginBlockLevel::None => 0,
            LoginBlockLevel::FiveMinutes => 1,
            LoginBlockLevel::FifteenMinutes => 2,
            LoginBlockLevel::TwentyFourHours => 3,
        }
    }

    /// Inverse of [`as_u8`](Self::as_u8). Unknown values clamp to the highest
    /// tier rather than silently unblocking.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LoginBlockLevel::None,
            1 => LoginBlockLevel::FiveMinutes,
            2 => LoginBlockLevel::FifteenMinutes,
            _ => LoginBlockLevel::TwentyFourHours,
        }
    }
}

/// Decide whether the registration track is blocked.
///
/// Returns the block reason when `attempts` exceeds the configured ceiling,
/// `None` otherwise.
pub fn registration_block(attempts: u32, config: &LockoutConfig) -> Option<&'static str> {
    if attempts > config.registration_max_attempts {
        Some(REGISTRATION_BLOCK_REASON)
    } else {
        None
    }
}

/// Map a cumulative failed login count to its escalation tier.
///
/// The input is the total number of failed attempts since the last successful
/// login, not the index of the current attempt within an episode.
pub fn login_level(failed_attempts: u32, config: &LockoutConfig) -> LoginBlockLevel {
    if failed_attempts >= config.login_level_three_threshold {
        LoginBlockLevel::TwentyFourHours
    } else if failed_attempts >= config.login_level_two_threshold {
        LoginBlockLevel::FifteenMinutes
    } else if failed_attempts >= config.login_level_one_threshold {
        LoginBlockLevel::FiveMinutes
    } else {
        LoginBlockLevel::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_ceiling() {
        let config = LockoutConfig::default();

        for attempts in 0..=5 {
            assert!(registration_block(attempts, &config).is_none());
        }
        assert_eq!(
            registration_block(6, &config),
            Some(REGISTRATION_BLOCK_REASON)
        );
        assert_eq!(
            registration_block(100, &config),
            Some(REGISTRATION_BLOCK_REASON)
        );
    }

    #[test]
    fn test_login_level_table() {
        let config = LockoutConfig::default();

        assert_eq!(login_level(0, &config), LoginBlockLevel::None);
        assert_eq!(login_level(1, &config), LoginBlockLevel::None);
        assert_eq!(login_level(2, &config), LoginBlockLevel::None);
        assert_eq!(login_level(3, &config), LoginBlockLevel::FiveMinutes);
        assert_eq!(login_level(4, &config), LoginBlockLevel::FiveMinutes);
        assert_eq!(login_level(5, &config), LoginBlockLevel::FifteenMinutes);
        assert_eq!(login_level(6, &config), LoginBlockLevel::TwentyFourHours);
        assert_eq!(login_level(50, &config), LoginBlockLevel::TwentyFourHours);
    }

    #[test]
    fn test_level_ordering_and_durations() {
        let config = LockoutConfig::default();

        assert!(LoginBlockLevel::None < LoginBlockLevel::FiveMinutes);
        assert!(LoginBlockLevel::FiveMinutes < LoginBlockLevel::FifteenMinutes);
        assert!(LoginBlockLevel::FifteenMinutes < LoginBlockLevel::TwentyFourHours);

        assert_eq!(LoginBlockLevel::None.duration(&config), None);
        assert_eq!(
            LoginBlockLevel::FiveMinutes.duration(&config),
            Some(Duration::minutes(5))
        );
        assert_eq!(
            LoginBlockLevel::FifteenMinutes.duration(&config),
            Some(Duration::minutes(15))
        );
        assert_eq!(
            LoginBlockLevel::TwentyFourHours.duration(&config),
            Some(Duration::hours(24))
        );
    }

    #[test]
    fn test_level_u8_round_trip() {
        for level in [
            LoginBlockLevel::None,
            LoginBlockLevel::FiveMinutes,
            LoginBlockLevel::FifteenMinutes,
            LoginBlockLevel::TwentyFourHours,
        ] {
            assert_eq!(LoginBlockLevel::from_u8(level.as_u8()), level);
        }

        // Out-of-range values clamp up, never down.
        assert_eq!(
            LoginBlockLevel::from_u8(9),
            LoginBlockLevel::TwentyFourHours
        );
    }
}
