//! System error types for IO, watching, locking and external commands.
//!
//! These errors represent failures in system operations that are typically
//! out of the user's direct control.

/// System errors represent failures in IO, the watcher, or spawned commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SystemError {
    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(String),
    /// External command (the default-handler opener) failed
    #[error("Command error: {0}")]
    Command(String),
    /// Directory watcher could not be created or attached
    #[error("Watch error: {0}")]
    Watch(String),
    /// Single-instance lock could not be taken or inspected
    #[error("Instance lock error: {0}")]
    InstanceLock(String),
    /// Scheduler has been shut down
    #[error("Scheduler is shut down and no longer accepts tasks")]
    SchedulerClosed,
}

impl SystemError {
    /// Get exit code for system errors (always 2).
    pub const fn exit_code(&self) -> i32 {
        2
    }
}
