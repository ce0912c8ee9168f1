//! Repository traits for the data access layer
//!
//! This module defines the repository interfaces that services use to
//! interact with storage. These traits provide a clean abstraction over the
//! underlying storage implementation.
//!
//! # Trait Hierarchy
//!
//! - [`AttemptRepository`] defines the operations on attempt records
//! - [`AttemptRepositoryProvider`] provides access to an attempt repository
//! - [`RepositoryProvider`] is a supertrait adding storage lifecycle methods
//!
//! Storage backends implement the provider traits once and plug into the
//! façade unchanged.

pub mod adapter;
pub mod attempt;
pub mod memory;

pub use adapter::AttemptRepositoryAdapter;
pub use attempt::AttemptRepository;
pub use memory::{InMemoryAttemptRepository, InMemoryRepositoryProvider};

use async_trait::async_trait;

use crate::Error;

/// Provider trait for attempt repository access.
pub trait AttemptRepositoryProvider: Send + Sync + 'static {
    /// The attempt repository implementation type
    type AttemptRepo: AttemptRepository;

    /// Get the attempt repository
    fn attempts(&self) -> &Self::AttemptRepo;
}

/// Unified provider trait combining repository access with storage lifecycle.
#[async_trait]
pub trait RepositoryProvider: AttemptRepositoryProvider + Send + Sync + 'static {
    /// Run any pending storage migrations.
    async fn migrate(&self) -> Result<(), Error>;

    /// Check that the underlying storage is reachable.
    async fn health_check(&self) -> Result<(), Error>;
}
