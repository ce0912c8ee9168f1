//! SQLite implementation of the attempt repository.

use async_trait::async_trait;
use chrono::DateTime;
use sqlx::SqlitePool;

use lockgate_core::{
    Error,
    error::StorageError,
    policy::LoginBlockLevel,
    record::{AttemptRecord, DeviceId},
    repositories::AttemptRepository,
};

/// SQLite repository for per-device attempt records.
pub struct SqliteAttemptRepository {
    pool: SqlitePool,
}

impl SqliteAttemptRepository {
    /// Create a new SQLite attempt repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Internal struct for query results. Timestamps are unix seconds, the block
/// level is its numeric form (0 through 3).
#[derive(Debug, sqlx::FromRow)]
struct SqliteAttemptRecord {
    device_id: String,
    registration_attempts: i64,
    last_attempt_at: Option<i64>,
    is_blocked: bool,
    blocked_at: Option<i64>,
    block_reason: Option<String>,
    unblock_request_sent: bool,
    unblock_request_message: Option<String>,
    login_attempts: i64,
    last_login_attempt_at: Option<i64>,
    login_block_level: i64,
    login_block_expires_at: Option<i64>,
}

impl From<SqliteAttemptRecord> for AttemptRecord {
    fn from(row: SqliteAttemptRecord) -> Self {
        AttemptRecord {
            device_id: DeviceId::from(row.device_id),
            registration_attempts: row.registration_attempts as u32,
            last_attempt_at: row.last_attempt_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            is_blocked: row.is_blocked,
            blocked_at: row.blocked_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            block_reason: row.block_reason,
            unblock_request_sent: row.unblock_request_sent,
            unblock_request_message: row.unblock_request_message,
            login_attempts: row.login_attempts as u32,
            last_login_attempt_at: row
                .last_login_attempt_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            login_block_level: LoginBlockLevel::from_u8(row.login_block_level as u8),
            login_block_expires_at: row
                .login_block_expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT device_id, registration_attempts, last_attempt_at, is_blocked,
           blocked_at, block_reason, unblock_request_sent,
           unblock_request_message, login_attempts, last_login_attempt_at,
           login_block_level, login_block_expires_at
    FROM device_attempts
    WHERE device_id = ?
"#;

#[async_trait]
impl AttemptRepository for SqliteAttemptRepository {
    async fn find(&self, device_id: &DeviceId) -> Result<Option<AttemptRecord>, Error> {
        let row = sqlx::query_as::<_, SqliteAttemptRecord>(SELECT_COLUMNS)
            .bind(device_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to find attempt record");
                StorageError::Database("Failed to find attempt record".to_string())
            })?;

        Ok(row.map(Into::into))
    }

    async fn find_or_create(&self, device_id: &DeviceId) -> Result<AttemptRecord, Error> {
        // ON CONFLICT DO NOTHING keeps creation idempotent under races; the
        // follow-up select returns whichever row won.
        sqlx::query(
            r#"
            INSERT INTO device_attempts (device_id)
            VALUES (?)
            ON CONFLICT (device_id) DO NOTHING
            "#,
        )
        .bind(device_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create attempt record");
            StorageError::Database("Failed to create attempt record".to_string())
        })?;

        let row = sqlx::query_as::<_, SqliteAttemptRecord>(SELECT_COLUMNS)
            .bind(device_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to load attempt record after insert");
                StorageError::Database("Failed to load attempt record after insert".to_string())
            })?;

        Ok(row.into())
    }

    async fn update(&self, record: &AttemptRecord) -> Result<AttemptRecord, Error> {
        let row = sqlx::query_as::<_, SqliteAttemptRecord>(
            r#"
            UPDATE device_attempts
            SET registration_attempts = ?,
                last_attempt_at = ?,
                is_blocked = ?,
                blocked_at = ?,
                block_reason = ?,
                unblock_request_sent = ?,
                unblock_request_message = ?,
                login_attempts = ?,
                last_login_attempt_at = ?,
                login_block_level = ?,
                login_block_expires_at = ?
            WHERE device_id = ?
            RETURNING device_id, registration_attempts, last_attempt_at, is_blocked,
                      blocked_at, block_reason, unblock_request_sent,
                      unblock_request_message, login_attempts, last_login_attempt_at,
                      login_block_level, login_block_expires_at
            "#,
        )
        .bind(record.registration_attempts as i64)
        .bind(record.last_attempt_at.map(|dt| dt.timestamp()))
        .bind(record.is_blocked)
        .bind(record.blocked_at.map(|dt| dt.timestamp()))
        .bind(record.block_reason.as_deref())
        .bind(record.unblock_request_sent)
        .bind(record.unblock_request_message.as_deref())
        .bind(record.login_attempts as i64)
        .bind(record.last_login_attempt_at.map(|dt| dt.timestamp()))
        .bind(record.login_block_level.as_u8() as i64)
        .bind(record.login_block_expires_at.map(|dt| dt.timestamp()))
        .bind(record.device_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to update attempt record");
            StorageError::Database("Failed to update attempt record".to_string())
        })?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(Error::NotFound(record.device_id.to_string())),
        }
    }
}
