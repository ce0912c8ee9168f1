//! Centralized validation utilities for the lockgate policy engine
//!
//! This module provides a single source of truth for input validation,
//! ensuring the engine re-validates everything regardless of what the calling
//! endpoint already checked (defense in depth).

use crate::error::ValidationError;
use crate::record::DeviceId;

/// Minimum length of an unblock request message, in characters.
pub const UNBLOCK_MESSAGE_MIN_CHARS: usize = 30;

/// Maximum length of an unblock request message, in characters.
pub const UNBLOCK_MESSAGE_MAX_CHARS: usize = 500;

/// Validates a device identifier.
///
/// # Examples
///
/// ```rust
/// use lockgate_core::record::DeviceId;
/// use lockgate_core::validation::validate_device_id;
///
/// assert!(validate_device_id(&DeviceId::new("dev_abc")).is_ok());
/// assert!(validate_device_id(&DeviceId::new("")).is_err());
/// ```
pub fn validate_device_id(device_id: &DeviceId) -> Result<(), ValidationError> {
    if device_id.as_str().is_empty() {
        return Err(ValidationError::EmptyDeviceId);
    }
    Ok(())
}

/// Validates an unblock request message.
///
/// Length bounds are counted in characters, not bytes, so multi-byte text is
/// not penalized.
pub fn validate_unblock_message(message: &str) -> Result<(), ValidationError> {
    let len = message.chars().count();
    if !(UNBLOCK_MESSAGE_MIN_CHARS..=UNBLOCK_MESSAGE_MAX_CHARS).contains(&len) {
        return Err(ValidationError::MessageLength {
            len,
            min: UNBLOCK_MESSAGE_MIN_CHARS,
            max: UNBLOCK_MESSAGE_MAX_CHARS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_device_id() {
        assert!(validate_device_id(&DeviceId::new("dev_abc")).is_ok());
        assert!(matches!(
            validate_device_id(&DeviceId::new("")),
            Err(ValidationError::EmptyDeviceId)
        ));
    }

    #[test]
    fn test_validate_unblock_message_bounds() {
        assert!(validate_unblock_message(&"a".repeat(30)).is_ok());
        assert!(validate_unblock_message(&"a".repeat(500)).is_ok());

        let too_short = validate_unblock_message(&"a".repeat(10));
        assert!(matches!(
            too_short,
            Err(ValidationError::MessageLength { len: 10, .. })
        ));

        let too_long = validate_unblock_message(&"a".repeat(600));
        assert!(matches!(
            too_long,
            Err(ValidationError::MessageLength { len: 600, .. })
        ));
    }

    #[test]
    fn test_message_length_counts_characters_not_bytes() {
        // 30 characters, each 3 bytes in UTF-8.
        let message = "\u{65E5}".repeat(30);
        assert!(message.len() > UNBLOCK_MESSAGE_MAX_CHARS / 3);
        assert!(validate_unblock_message(&message).is_ok());
    }
}
