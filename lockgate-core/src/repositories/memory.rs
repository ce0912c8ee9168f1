//! In-memory implementation of the attempt repository.
//!
//! Backed by a mutex-guarded map, suitable for tests and single-process
//! deployments that do not need attempt state to survive a restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    Error,
    record::{AttemptRecord, DeviceId},
    repositories::{AttemptRepository, AttemptRepositoryProvider, RepositoryProvider},
};

/// Attempt repository keeping all records in process memory.
#[derive(Default)]
pub struct InMemoryAttemptRepository {
    records: Mutex<HashMap<String, AttemptRecord>>,
}

impl InMemoryAttemptRepository {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, AttemptRecord>> {
        // A poisoned mutex means a panic while holding the guard; the map
        // only ever holds complete records, so recover the inner value.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryAttemptRepository {
    async fn find(&self, device_id: &DeviceId) -> Result<Option<AttemptRecord>, Error> {
        Ok(self.lock().get(device_id.as_str()).cloned())
    }

    async fn find_or_create(&self, device_id: &DeviceId) -> Result<AttemptRecord, Error> {
        let mut records = self.lock();
        let record = records
            .entry(device_id.as_str().to_string())
            .or_insert_with(|| AttemptRecord::new(device_id.clone()));
        Ok(record.clone())
    }

    async fn update(&self, record: &AttemptRecord) -> Result<AttemptRecord, Error> {
        self.lock()
            .insert(record.device_id.as_str().to_string(), record.clone());
        Ok(record.clone())
    }
}

/// Repository provider backed by [`InMemoryAttemptRepository`].
pub struct InMemoryRepositoryProvider {
    attempts: Arc<InMemoryAttemptRepository>,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(InMemoryAttemptRepository::new()),
        }
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptRepositoryProvider for InMemoryRepositoryProvider {
    type AttemptRepo = InMemoryAttemptRepository;

    fn attempts(&self) -> &Self::AttemptRepo {
        &self.attempts
    }
}

#[async_trait]
impl RepositoryProvider for InMemoryRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}
