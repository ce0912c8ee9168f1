//! Core functionality for the lockgate project
//!
//! This module contains the policy engine: the per-device attempt record,
//! the device fingerprint derivation, the progressive lockout policy, and the
//! services that tie them together (attempt tracking, the access gate, and
//! the unblock workflow).
//!
//! The crate is storage- and transport-agnostic. Everything durable sits
//! behind the [`AttemptRepository`](repositories::AttemptRepository) trait;
//! backends and wire layers live in their own crates.
//!
//! See [`AttemptRecord`] for the core record struct, [`LockoutConfig`] for
//! the policy thresholds, and the [`services`] module for the engine itself.

pub mod error;
pub mod fingerprint;
pub mod lock;
pub mod policy;
pub mod record;
pub mod repositories;
pub mod services;
pub mod validation;

pub use error::Error;
pub use fingerprint::DeviceSignals;
pub use lock::DeviceLocks;
pub use policy::{LockoutConfig, LoginBlockLevel};
pub use record::{AttemptRecord, DeviceId};
