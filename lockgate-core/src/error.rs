use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid state: {0}")]
    State(#[from] StateError),

    #[error("No attempt record for device: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Device id must not be empty")]
    EmptyDeviceId,

    #[error("Message must be between {min} and {max} characters, got {len}")]
    MessageLength { len: usize, min: usize, max: usize },

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Device is not blocked")]
    NotBlocked,

    #[error("An unblock request is already pending review")]
    RequestAlreadyPending,

    #[error("No unblock request is pending review")]
    NoPendingRequest,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    /// Deterministic caller errors. These must be surfaced unchanged and
    /// never retried.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_state_error(&self) -> bool {
        matches!(self, Error::State(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Transient storage failures. Callers may retry these with backoff;
    /// the policy engine itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let validation_error = Error::Validation(ValidationError::MessageLength {
            len: 10,
            min: 30,
            max: 500,
        });
        assert_eq!(
            validation_error.to_string(),
            "Validation error: Message must be between 30 and 500 characters, got 10"
        );

        let state_error = Error::State(StateError::NotBlocked);
        assert_eq!(state_error.to_string(), "Invalid state: Device is not blocked");

        let not_found = Error::NotFound("dev_abc".to_string());
        assert_eq!(
            not_found.to_string(),
            "No attempt record for device: dev_abc"
        );

        let storage_error = Error::Storage(StorageError::Unavailable("timeout".to_string()));
        assert_eq!(
            storage_error.to_string(),
            "Storage error: Store unavailable: timeout"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::Validation(ValidationError::EmptyDeviceId).is_validation_error());
        assert!(!Error::Validation(ValidationError::EmptyDeviceId).is_transient());

        assert!(Error::State(StateError::RequestAlreadyPending).is_state_error());
        assert!(Error::NotFound("dev_abc".to_string()).is_not_found());

        assert!(Error::Storage(StorageError::Connection("refused".to_string())).is_transient());
        assert!(!Error::Storage(StorageError::Connection("refused".to_string())).is_state_error());
    }

    #[test]
    fn test_error_from_conversions() {
        let validation_error = ValidationError::EmptyDeviceId;
        let error: Error = validation_error.into();
        assert!(matches!(error, Error::Validation(ValidationError::EmptyDeviceId)));

        let state_error = StateError::NoPendingRequest;
        let error: Error = state_error.into();
        assert!(matches!(error, Error::State(StateError::NoPendingRequest)));
    }
}
