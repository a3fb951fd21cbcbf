//! Error types for lifecyclectl
//!
//! Library code uses `crate::error::Result<T>` which returns
//! `LifecyclectlError`. CLI code uses `anyhow::Result<T>` for top-level
//! error handling; the conversion happens at the CLI boundary so error
//! chains are preserved rather than flattened to strings.
//!
//! Errors implement `IsRetryable` so the `ExponentialBackoffPolicy` in
//! `src/retry.rs` can decide whether an operation should be retried.
//! Transient cloud failures (`Aws`, `CloudProvider`, `Io`, `Retryable`)
//! retry; `Validation` and `Config` fail immediately because invalid input
//! will not become valid on a second attempt.

use thiserror::Error;

/// Main error type for lifecyclectl
#[derive(Error, Debug)]
pub enum LifecyclectlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cloud provider error: {provider} - {message}")]
    CloudProvider {
        provider: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Resource not found: {resource_type} - {resource_id}")]
    ResourceNotFound {
        resource_type: String,
        resource_id: String,
    },

    #[error("Retryable error (attempt {attempt}/{max_attempts}): {reason}")]
    Retryable {
        attempt: u32,
        max_attempts: u32,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("AWS SDK error: {0}")]
    Aws(String),

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LifecyclectlError>;

/// Trait for determining if an error is retryable
///
/// Used by `RetryPolicy` implementations to determine whether an error
/// should trigger a retry attempt.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for LifecyclectlError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            LifecyclectlError::Retryable { .. }
                | LifecyclectlError::CloudProvider { .. }
                | LifecyclectlError::Aws(_)
                | LifecyclectlError::Io(_)
        )
    }
}
