//! Repository implementations for SQLite storage

pub mod attempt;

pub use attempt::SqliteAttemptRepository;

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

use lockgate_core::{
    Error,
    error::StorageError,
    repositories::{AttemptRepositoryProvider, RepositoryProvider},
};

/// Repository provider implementation for SQLite
///
/// This struct implements the individual repository provider traits as well
/// as the unified `RepositoryProvider` trait.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    attempts: Arc<SqliteAttemptRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let attempts = Arc::new(SqliteAttemptRepository::new(pool.clone()));
        Self { pool, attempts }
    }
}

impl AttemptRepositoryProvider for SqliteRepositoryProvider {
    type AttemptRepo = SqliteAttemptRepository;

    fn attempts(&self) -> &Self::AttemptRepo {
        &self.attempts
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS device_attempts (
                device_id TEXT PRIMARY KEY,
                registration_attempts INTEGER NOT NULL DEFAULT 0,
                last_attempt_at INTEGER,
                is_blocked BOOLEAN NOT NULL DEFAULT FALSE,
                blocked_at INTEGER,
                block_reason TEXT,
                unblock_request_sent BOOLEAN NOT NULL DEFAULT FALSE,
                unblock_request_message TEXT,
                login_attempts INTEGER NOT NULL DEFAULT 0,
                last_login_attempt_at INTEGER,
                login_block_level INTEGER NOT NULL DEFAULT 0,
                login_block_expires_at INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Database("Failed to run migrations".to_string()))
        })?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_device_attempts_pending_requests
            ON device_attempts (unblock_request_sent)
            WHERE unblock_request_sent = TRUE
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create indexes");
            Error::Storage(StorageError::Database("Failed to create indexes".to_string()))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;
        Ok(())
    }
}
