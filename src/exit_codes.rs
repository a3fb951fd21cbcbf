//! Exit code standardization for lifecyclectl
//!
//! Provides consistent exit codes for different error types so scripts and
//! schedulers wrapping the CLI can detect what went wrong.
//!
//! ## Exit Code Convention
//!
//! - `0` = Success
//! - `1` = User error (invalid input, validation failure, resource not found)
//! - `2` = System error (AWS API failure, network error, I/O error)
//! - `3` = Configuration error (missing config, invalid credentials, config parse error)

use crate::error::LifecyclectlError;

/// Standard exit codes for lifecyclectl
pub mod codes {
    /// Success
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    /// User error (invalid input, validation failure)
    pub const USER_ERROR: i32 = 1;
    /// System error (AWS API failure, network error)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error (missing config, invalid credentials)
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map a LifecyclectlError to an appropriate exit code
pub fn exit_code_for_error(error: &LifecyclectlError) -> i32 {
    use LifecyclectlError::*;
    match error {
        Config(_) => codes::CONFIG_ERROR,

        Validation { .. } => codes::USER_ERROR,
        ResourceNotFound { .. } => codes::USER_ERROR,

        CloudProvider { .. } => codes::SYSTEM_ERROR,
        Aws(_) => codes::SYSTEM_ERROR,
        Io(_) => codes::SYSTEM_ERROR,
        Retryable { .. } => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,
    }
}
