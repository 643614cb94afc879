//! Validation error types for configuration and input validation.
//!
//! These errors represent user input or configuration problems that can be
//! corrected by the user.

/// Validation errors represent incorrect user input or configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Parse error when reading configuration or data
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ValidationError {
    /// Get exit code for validation errors (always 1).
    pub const fn exit_code(&self) -> i32 {
        1
    }
}
