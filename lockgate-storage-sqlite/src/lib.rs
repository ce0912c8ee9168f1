//! SQLite storage backend for lockgate
//!
//! This crate provides a SQLite storage implementation for the lockgate
//! device-bound access control engine using the [`sqlx`](https://github.com/launchbadge/sqlx)
//! crate. Attempt records are persisted in a single `device_attempts` table
//! keyed by device id, with timestamps stored as unix seconds.
//!
//! # Example
//!
//! ```rust,no_run
//! use lockgate_storage_sqlite::SqliteRepositoryProvider;
//! use lockgate_core::repositories::RepositoryProvider;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = sqlx::SqlitePool::connect("sqlite:lockgate.db?mode=rwc")
//!         .await
//!         .unwrap();
//!     let repositories = SqliteRepositoryProvider::new(pool);
//!     repositories.migrate().await.unwrap();
//! }
//! ```

pub mod repositories;

pub use repositories::{SqliteAttemptRepository, SqliteRepositoryProvider};
