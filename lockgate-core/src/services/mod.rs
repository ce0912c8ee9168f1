//! Service layer for the policy engine
//!
//! This module contains the concrete services built over the repository
//! traits: attempt tracking, the access gate, and the unblock workflow.

pub mod gate;
pub mod tracker;
pub mod unblock;

pub use gate::{AccessGateService, LoginDecision, RegistrationDecision};
pub use tracker::AttemptTrackerService;
pub use unblock::UnblockService;
