use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    Error,
    record::{AttemptRecord, DeviceId},
    repositories::{AttemptRepository, RepositoryProvider},
};

/// Adapter that wraps a RepositoryProvider and implements the attempt
/// repository trait, so services can be generic over one repository type
/// while callers hand in a whole provider.
pub struct AttemptRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> AttemptRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> AttemptRepository for AttemptRepositoryAdapter<R> {
    async fn find(&self, device_id: &DeviceId) -> Result<Option<AttemptRecord>, Error> {
        self.provider.attempts().find(device_id).await
    }

    async fn find_or_create(&self, device_id: &DeviceId) -> Result<AttemptRecord, Error> {
        self.provider.attempts().find_or_create(device_id).await
    }

    async fn update(&self, record: &AttemptRecord) -> Result<AttemptRecord, Error> {
        self.provider.attempts().update(record).await
    }
}
