//! Device fingerprinting
//!
//! Derives a stable device identifier from client-observable environment
//! signals, without any persistent client-side storage. The same signal tuple
//! always produces the same identifier; distinct tuples collide only with the
//! probability of a truncated SHA3-256 collision.
//!
//! This is a fingerprint, not a credential. Every signal is client-reported
//! and can be spoofed, so the resulting id is suitable as a rate-limiting key
//! and nothing more. When a client presents no signals at all, the derivation
//! returns the shared fallback id; callers must treat that as "unknown
//! device" and expect none of the per-device tracking guarantees to hold.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::record::DeviceId;

/// Client environment signals used to derive a device fingerprint.
///
/// All fields are optional; absent signals still contribute to the hash (as
/// explicit absence) so that a client reporting `None` differs from one
/// reporting an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSignals {
    /// Browser or client user agent string.
    pub user_agent: Option<String>,
    /// Preferred locale, e.g. `en-US`.
    pub locale: Option<String>,
    /// Screen width in CSS pixels.
    pub screen_width: Option<u32>,
    /// Screen height in CSS pixels.
    pub screen_height: Option<u32>,
    /// Color depth in bits per pixel.
    pub color_depth: Option<u32>,
    /// Offset from UTC in minutes, as reported by the client clock.
    pub timezone_offset_minutes: Option<i32>,
    /// Number of logical processors.
    pub hardware_concurrency: Option<u32>,
    /// Client platform string, e.g. `Win32` or `MacIntel`.
    pub platform: Option<String>,
}

impl DeviceSignals {
    /// Whether the client reported no signals at all.
    pub fn is_empty(&self) -> bool {
        self.user_agent.is_none()
            && self.locale.is_none()
            && self.screen_width.is_none()
            && self.screen_height.is_none()
            && self.color_depth.is_none()
            && self.timezone_offset_minutes.is_none()
            && self.hardware_concurrency.is_none()
            && self.platform.is_none()
    }

    /// Derive the device identifier for this signal tuple.
    ///
    /// Deterministic and side-effect free. Returns [`DeviceId::fallback`]
    /// when no signals are present.
    pub fn fingerprint(&self) -> DeviceId {
        if self.is_empty() {
            return DeviceId::fallback();
        }

        let mut hasher = Sha3_256::new();
        hash_text(&mut hasher, self.user_agent.as_deref());
        hash_text(&mut hasher, self.locale.as_deref());
        hash_number(&mut hasher, self.screen_width.map(i64::from));
        hash_number(&mut hasher, self.screen_height.map(i64::from));
        hash_number(&mut hasher, self.color_depth.map(i64::from));
        hash_number(&mut hasher, self.timezone_offset_minutes.map(i64::from));
        hash_number(&mut hasher, self.hardware_concurrency.map(i64::from));
        hash_text(&mut hasher, self.platform.as_deref());

        let digest = hasher.finalize();
        // 96 bits of the digest keeps the id short while leaving collisions
        // beyond anything a lockout table will ever see.
        let encoded = BASE64_URL_SAFE_NO_PAD.encode(&digest[..12]);

        DeviceId::new(&format!("dev_{encoded}"))
    }
}

// Each field is hashed with a length prefix and a presence tag so that
// adjacent fields cannot run together ("ab" + "c" vs "a" + "bc") and `None`
// stays distinct from `Some("")`.
fn hash_text(hasher: &mut Sha3_256, value: Option<&str>) {
    match value {
        Some(text) => {
            hasher.update([1u8]);
            hasher.update((text.len() as u64).to_be_bytes());
            hasher.update(text.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

fn hash_number(hasher: &mut Sha3_256, value: Option<i64>) {
    match value {
        Some(number) => {
            hasher.update([1u8]);
            hasher.update(number.to_be_bytes());
        }
        None => hasher.update([0u8]),
    }
}
