//! Input validation utilities
//!
//! Provides validation functions for user inputs to prevent invalid data
//! from reaching the EC2 API.

use crate::error::{LifecyclectlError, Result};

/// Validate EC2 instance ID format
///
/// Instance IDs must start with "i-" followed by hexadecimal characters.
pub fn validate_instance_id(instance_id: &str) -> Result<()> {
    if !instance_id.starts_with("i-") {
        return Err(LifecyclectlError::Validation {
            field: "instance_id".to_string(),
            reason: format!("Instance ID must start with 'i-', got: {}", instance_id),
        });
    }

    if instance_id.len() < 10 || instance_id.len() > 19 {
        return Err(LifecyclectlError::Validation {
            field: "instance_id".to_string(),
            reason: format!(
                "Instance ID must be 10-19 characters, got: {} (len: {})",
                instance_id,
                instance_id.len()
            ),
        });
    }

    let id_part = &instance_id[2..];
    if !id_part.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LifecyclectlError::Validation {
            field: "instance_id".to_string(),
            reason: format!(
                "Instance ID must contain only alphanumeric characters after 'i-', got: {}",
                instance_id
            ),
        });
    }

    Ok(())
}

/// Validate an EC2 tag key
///
/// Tag keys are 1-128 characters and may not use the reserved "aws:" prefix.
pub fn validate_tag_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(LifecyclectlError::Validation {
            field: "tag_key".to_string(),
            reason: "Tag key cannot be empty".to_string(),
        });
    }

    if key.len() > 128 {
        return Err(LifecyclectlError::Validation {
            field: "tag_key".to_string(),
            reason: format!("Tag key must be <= 128 characters, got: {} (len: {})", key, key.len()),
        });
    }

    if key.to_ascii_lowercase().starts_with("aws:") {
        return Err(LifecyclectlError::Validation {
            field: "tag_key".to_string(),
            reason: format!("Tag key cannot use the reserved 'aws:' prefix, got: {}", key),
        });
    }

    Ok(())
}

/// Validate an EC2 tag value used as a filter
///
/// The tag filter maps each key to exactly one required value, so an empty
/// value is rejected even though EC2 itself allows empty tag values.
pub fn validate_tag_value(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(LifecyclectlError::Validation {
            field: "tag_value".to_string(),
            reason: "Tag filter value cannot be empty".to_string(),
        });
    }

    if value.len() > 256 {
        return Err(LifecyclectlError::Validation {
            field: "tag_value".to_string(),
            reason: format!(
                "Tag value must be <= 256 characters, got: {} (len: {})",
                value,
                value.len()
            ),
        });
    }

    Ok(())
}

/// Validate the root volume age threshold (in hours)
///
/// Thresholds must be between 1 hour and 8760 hours (one year).
pub fn validate_threshold_hours(hours: i64) -> Result<()> {
    if hours < 1 {
        return Err(LifecyclectlError::Validation {
            field: "threshold_hours".to_string(),
            reason: format!("Age threshold must be at least 1 hour, got: {}", hours),
        });
    }

    if hours > 8760 {
        return Err(LifecyclectlError::Validation {
            field: "threshold_hours".to_string(),
            reason: format!("Age threshold must be at most 8760 hours (1 year), got: {}", hours),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_instance_id() {
        assert!(validate_instance_id("i-1234567890abcdef0").is_ok());
        assert!(validate_instance_id("i-0abcdef1234567890").is_ok());
        assert!(validate_instance_id("i-123").is_err()); // Too short
        assert!(validate_instance_id("vol-123").is_err()); // Wrong prefix
        assert!(validate_instance_id("invalid").is_err()); // No prefix
        assert!(validate_instance_id("i-12345678_0abcdef").is_err()); // Invalid char
    }

    #[test]
    fn test_validate_tag_key() {
        assert!(validate_tag_key("env").is_ok());
        assert!(validate_tag_key("lifecycle").is_ok());
        assert!(validate_tag_key("team/owner").is_ok());
        assert!(validate_tag_key("").is_err()); // Empty
        assert!(validate_tag_key(&"k".repeat(129)).is_err()); // Too long
        assert!(validate_tag_key("aws:cloudformation:stack-name").is_err()); // Reserved
        assert!(validate_tag_key("AWS:reserved").is_err()); // Reserved, case-insensitive
    }

    #[test]
    fn test_validate_tag_value() {
        assert!(validate_tag_value("dev").is_ok());
        assert!(validate_tag_value("temporary").is_ok());
        assert!(validate_tag_value("").is_err()); // Empty
        assert!(validate_tag_value(&"v".repeat(257)).is_err()); // Too long
    }

    #[test]
    fn test_validate_threshold_hours() {
        assert!(validate_threshold_hours(1).is_ok());
        assert!(validate_threshold_hours(24).is_ok());
        assert!(validate_threshold_hours(8760).is_ok());
        assert!(validate_threshold_hours(0).is_err()); // Too small
        assert!(validate_threshold_hours(8761).is_err()); // Too large
    }
}
