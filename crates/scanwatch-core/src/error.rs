//! Error types for ScanWatch with categorization:
//!
//! - **Validation errors**: Input validation and configuration (exit code 1)
//! - **System errors**: IO, watching, locking, spawning the opener (exit code 2)
//!
//! Retry-chain failures never surface here: they are reported on the
//! activity log. Only setup and CLI paths propagate these errors.

pub mod system;
pub mod validation;

pub use system::SystemError;
pub use validation::ValidationError;

/// Top-level error type that can represent any error in the system.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Validation error from input or configuration
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// System error from IO or external operations
    #[error(transparent)]
    System(#[from] SystemError),
    /// Unknown error (fallback)
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a validation error from an invalid config.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::InvalidConfig(msg.into()))
    }

    /// Create a validation error from a parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::ParseError(msg.into()))
    }

    /// Create a system error from an IO error.
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::System(SystemError::IoError(msg.into()))
    }

    /// Create a system error from a failed external command.
    pub fn command_error(msg: impl Into<String>) -> Self {
        Self::System(SystemError::Command(msg.into()))
    }

    /// Create a system error from the directory watcher.
    pub fn watch_error(msg: impl Into<String>) -> Self {
        Self::System(SystemError::Watch(msg.into()))
    }

    /// Create a system error from the single-instance lock.
    pub fn instance_lock(msg: impl Into<String>) -> Self {
        Self::System(SystemError::InstanceLock(msg.into()))
    }

    /// The scheduler no longer accepts tasks.
    pub const fn scheduler_closed() -> Self {
        Self::System(SystemError::SchedulerClosed)
    }

    /// Returns the appropriate exit code for this error type.
    ///
    /// - 1: User error (validation, bad configuration)
    /// - 2: System error (IO, watcher, lock, external commands)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(err) => err.exit_code(),
            Self::System(err) => err.exit_code(),
            Self::Unknown(_) => 2,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::parse_error(format!("Failed to parse config: {err}"))
    }
}

impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Self::watch_error(err.to_string())
    }
}
