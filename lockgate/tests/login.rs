use std::sync::Arc;

use chrono::{Duration, Utc};
use lockgate::{DeviceId, Lockgate, LoginBlockLevel, LoginDecision};
use lockgate_core::repositories::{AttemptRepository, RepositoryProvider};

#[cfg(feature = "sqlite")]
use lockgate::SqliteRepositoryProvider;
#[cfg(feature = "sqlite")]
use lockgate_storage_sqlite::SqliteAttemptRepository;

#[cfg(feature = "sqlite")]
async fn setup() -> (Lockgate<SqliteRepositoryProvider>, SqliteAttemptRepository) {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    let repositories = SqliteRepositoryProvider::new(pool.clone());
    repositories.migrate().await.unwrap();
    (
        Lockgate::new(Arc::new(repositories)),
        SqliteAttemptRepository::new(pool),
    )
}

fn expect_deny(decision: LoginDecision) -> (chrono::DateTime<Utc>, i64) {
    match decision {
        LoginDecision::Deny {
            expires_at,
            remaining_minutes,
            ..
        } => (expires_at, remaining_minutes),
        LoginDecision::Allow => panic!("expected deny"),
    }
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_progressive_lockout_table() {
    let (lockgate, _) = setup().await;
    let device_id = DeviceId::new("dev_login_table");

    // Failures one and two: still allowed.
    for _ in 0..2 {
        lockgate.record_login_failure(&device_id).await.unwrap();
        assert!(lockgate.check_login(&device_id).await.unwrap().is_allowed());
    }

    // Failure three: five-minute block.
    lockgate.record_login_failure(&device_id).await.unwrap();
    let (expires_at, remaining) = expect_deny(lockgate.check_login(&device_id).await.unwrap());
    assert!((1..=5).contains(&remaining));
    assert!(expires_at <= Utc::now() + Duration::minutes(5));

    // Failures four and five: fifth reaches the fifteen-minute tier.
    lockgate.record_login_failure(&device_id).await.unwrap();
    lockgate.record_login_failure(&device_id).await.unwrap();
    let (_, remaining) = expect_deny(lockgate.check_login(&device_id).await.unwrap());
    assert!((6..=15).contains(&remaining));

    // Failure six: twenty-four hours.
    lockgate.record_login_failure(&device_id).await.unwrap();
    let (expires_at, remaining) = expect_deny(lockgate.check_login(&device_id).await.unwrap());
    assert!((16..=1440).contains(&remaining));
    assert!(expires_at > Utc::now() + Duration::hours(23));
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_successful_login_resets_both_counter_and_level() {
    let (lockgate, _) = setup().await;
    let device_id = DeviceId::new("dev_login_reset");

    for _ in 0..4 {
        lockgate.record_login_failure(&device_id).await.unwrap();
    }
    assert!(!lockgate.check_login(&device_id).await.unwrap().is_allowed());

    let record = lockgate.record_login_success(&device_id).await.unwrap();
    assert_eq!(record.login_attempts, 0);
    assert_eq!(record.login_block_level, LoginBlockLevel::None);
    assert!(record.login_block_expires_at.is_none());

    assert!(lockgate.check_login(&device_id).await.unwrap().is_allowed());

    // After the reset the device starts over at the bottom of the table.
    lockgate.record_login_failure(&device_id).await.unwrap();
    assert!(lockgate.check_login(&device_id).await.unwrap().is_allowed());
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_lazy_expiry_allows_without_explicit_reset() {
    let (lockgate, repository) = setup().await;
    let device_id = DeviceId::new("dev_login_expiry");

    for _ in 0..3 {
        lockgate.record_login_failure(&device_id).await.unwrap();
    }
    assert!(!lockgate.check_login(&device_id).await.unwrap().is_allowed());

    // Age the block past its expiry directly in the store.
    let mut record = repository.find(&device_id).await.unwrap().unwrap();
    record.login_block_expires_at = Some(Utc::now() - Duration::seconds(1));
    repository.update(&record).await.unwrap();

    // Allowed again with no reset call, and the cumulative counter stands.
    assert!(lockgate.check_login(&device_id).await.unwrap().is_allowed());
    let record = repository.find(&device_id).await.unwrap().unwrap();
    assert_eq!(record.login_attempts, 3);
    assert_eq!(record.login_block_level, LoginBlockLevel::None);

    // The ratchet: the very next failure maps the counter straight back into
    // a timed block.
    lockgate.record_login_failure(&device_id).await.unwrap();
    assert!(!lockgate.check_login(&device_id).await.unwrap().is_allowed());
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_login_and_registration_blocks_are_independent() {
    let (lockgate, _) = setup().await;
    let device_id = DeviceId::new("dev_login_independent");

    for _ in 0..6 {
        lockgate.record_login_failure(&device_id).await.unwrap();
    }

    assert!(!lockgate.check_login(&device_id).await.unwrap().is_allowed());
    assert!(lockgate
        .check_registration(&device_id)
        .await
        .unwrap()
        .is_allowed());
}
